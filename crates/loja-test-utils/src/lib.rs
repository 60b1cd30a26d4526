//! Testing utilities for the loja workspace
//!
//! In-memory page doubles, canned content, and cart fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use loja_cart::{
    BadgeState, BadgeSurface, Cart, CartConfig, CartEngine, JsonCartStore, MemoryBackend,
    StorageBackend, StoreError,
};
use loja_ui::{
    AnimatedDialog, CartSurface, CartView, ContentError, Listener, Markup, ModalHost,
    PartialContentProvider, SummaryRefresh, UiError, View,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub type MemoryEngine = CartEngine<JsonCartStore<MemoryBackend>>;
pub type SwitchableEngine = CartEngine<JsonCartStore<Arc<SwitchableBackend>>>;

/// Amount from cents, e.g. `brl(4990)` is 49.90
pub fn brl(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn memory_engine() -> Arc<MemoryEngine> {
    Arc::new(CartEngine::new(
        JsonCartStore::new(MemoryBackend::new(), "cart"),
        CartConfig::default(),
    ))
}

pub fn engine_with(items: &[(&str, i64)]) -> Arc<MemoryEngine> {
    let engine = memory_engine();
    for (name, cents) in items {
        engine.add(name, brl(*cents), None).unwrap();
    }
    engine
}

/// Memory backend whose writes can be made to fail
#[derive(Debug, Default)]
pub struct SwitchableBackend {
    inner: MemoryBackend,
    failing: AtomicBool,
}

impl SwitchableBackend {
    pub fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for SwitchableBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.inner.remove(key)
    }
}

pub fn switchable_engine(items: &[(&str, i64)]) -> (Arc<SwitchableEngine>, Arc<SwitchableBackend>) {
    let backend = Arc::new(SwitchableBackend::default());
    let engine = Arc::new(CartEngine::new(
        JsonCartStore::new(backend.clone(), "cart"),
        CartConfig::default(),
    ));
    for (name, cents) in items {
        engine.add(name, brl(*cents), None).unwrap();
    }
    (engine, backend)
}

/// Serves fixed markup per view and can be told to fail
#[derive(Debug, Default)]
pub struct StaticContent {
    failing: Mutex<HashSet<View>>,
    calls: Mutex<HashMap<View, usize>>,
}

impl StaticContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(views: &[View]) -> Self {
        let content = Self::default();
        content.failing.lock().extend(views.iter().copied());
        content
    }

    pub fn recover(&self, view: View) {
        self.failing.lock().remove(&view);
    }

    pub fn calls(&self, view: View) -> usize {
        self.calls.lock().get(&view).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PartialContentProvider for StaticContent {
    async fn fetch(&self, view: View) -> Result<Markup, ContentError> {
        *self.calls.lock().entry(view).or_default() += 1;
        if self.failing.lock().contains(&view) {
            return Err(ContentError::Status { view, status: 503 });
        }
        Ok(Markup::new(format!("<section data-view=\"{view:?}\"></section>")))
    }
}

/// Dialog that opens and closes without delay
#[derive(Debug, Default)]
pub struct InstantDialog {
    open: AtomicBool,
    opens: AtomicUsize,
    closes: AtomicUsize,
}

impl InstantDialog {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnimatedDialog for InstantDialog {
    async fn begin_open(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.opens.fetch_add(1, Ordering::SeqCst);
    }

    async fn begin_close(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Page double recording every call
#[derive(Debug)]
pub struct RecordingPage {
    pub attached: Mutex<Vec<View>>,
    pub bindings: Mutex<Vec<(View, Vec<Listener>)>>,
    pub navigations: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub renders: Mutex<Vec<CartView>>,
    pub badges: Mutex<Vec<BadgeState>>,
    confirm_answer: AtomicBool,
}

impl Default for RecordingPage {
    fn default() -> Self {
        Self {
            attached: Mutex::default(),
            bindings: Mutex::default(),
            navigations: Mutex::default(),
            prompts: Mutex::default(),
            renders: Mutex::default(),
            badges: Mutex::default(),
            confirm_answer: AtomicBool::new(true),
        }
    }
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    pub fn last_render(&self) -> Option<CartView> {
        self.renders.lock().last().cloned()
    }

    pub fn last_badge(&self) -> Option<BadgeState> {
        self.badges.lock().last().copied()
    }

    pub fn bind_count(&self, view: View) -> usize {
        self.bindings.lock().iter().filter(|(v, _)| *v == view).count()
    }

    pub fn attach_count(&self, view: View) -> usize {
        self.attached.lock().iter().filter(|v| **v == view).count()
    }
}

impl ModalHost for RecordingPage {
    fn attach(&self, view: View, _markup: &Markup) -> Result<(), UiError> {
        self.attached.lock().push(view);
        Ok(())
    }

    fn bind(&self, view: View, listeners: &[Listener]) {
        self.bindings.lock().push((view, listeners.to_vec()));
    }

    fn navigate(&self, route: &str) {
        self.navigations.lock().push(route.to_string());
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().push(prompt.to_string());
        self.confirm_answer.load(Ordering::SeqCst)
    }
}

impl BadgeSurface for RecordingPage {
    fn render_badge(&self, badge: BadgeState) {
        self.badges.lock().push(badge);
    }
}

impl CartSurface for RecordingPage {
    fn render_cart(&self, view: &CartView) {
        self.renders.lock().push(view.clone());
    }
}

/// Summary double for the in-place upsell variant
#[derive(Debug, Default)]
pub struct RecordingSummary {
    pub refreshed: Mutex<Vec<Cart>>,
}

impl SummaryRefresh for RecordingSummary {
    fn refresh_summary(&self, cart: &Cart) {
        self.refreshed.lock().push(cart.clone());
    }
}
