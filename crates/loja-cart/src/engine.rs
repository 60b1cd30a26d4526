//! Cart engine
//!
//! Synchronous operations over the persisted cart. Each mutation:
//! 1. Loads the whole cart from the store
//! 2. Applies the change in memory
//! 3. Saves the whole cart back
//! 4. Notifies listeners (badge refresh and friends)
//!
//! Writers inside one process are serialized; separate processes sharing the
//! same slot race with last-writer-wins.

use crate::error::CartError;
use crate::line_item::{item_label, subtotal, Cart, LineItem, INSTALLATION_SERVICE};
use crate::store::CartStore;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cart configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Storage slot holding the cart
    pub storage_key: String,
    /// Flat fee of the installation add-on
    #[serde(with = "rust_decimal::serde::float")]
    pub installation_price: Decimal,
}

impl CartConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With storage key
    #[inline]
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// With installation price
    #[inline]
    #[must_use]
    pub fn with_installation_price(mut self, price: Decimal) -> Self {
        self.installation_price = price;
        self
    }
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_key: "cart".to_string(),
            installation_price: Decimal::new(12000, 2),
        }
    }
}

/// Badge shown next to the cart icon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeState {
    /// No displayable items: badge not rendered
    Hidden,
    /// Sum of displayable quantities
    Visible(u32),
}

impl BadgeState {
    /// Badge for a given item count
    #[inline]
    #[must_use]
    pub fn from_count(count: u32) -> Self {
        if count == 0 {
            Self::Hidden
        } else {
            Self::Visible(count)
        }
    }

    /// Count shown, zero when hidden
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        match self {
            Self::Hidden => 0,
            Self::Visible(n) => *n,
        }
    }
}

/// Observer of persisted cart changes
pub trait CartListener: Send + Sync {
    /// Called after every persisted mutation
    fn cart_changed(&self, cart: &Cart);
}

/// Where the badge gets drawn
pub trait BadgeSurface: Send + Sync {
    /// Show or hide the badge
    fn render_badge(&self, badge: BadgeState);
}

impl<T: BadgeSurface + ?Sized> BadgeSurface for Arc<T> {
    fn render_badge(&self, badge: BadgeState) {
        (**self).render_badge(badge);
    }
}

/// Listener that keeps the badge in sync with the cart
#[derive(Debug)]
pub struct BadgeRenderer<B> {
    surface: B,
}

impl<B: BadgeSurface> BadgeRenderer<B> {
    /// Create renderer drawing onto `surface`
    #[inline]
    #[must_use]
    pub fn new(surface: B) -> Self {
        Self { surface }
    }

    /// Draw the badge for `cart` right away
    pub fn refresh(&self, cart: &Cart) {
        self.surface
            .render_badge(BadgeState::from_count(cart.badge_count()));
    }
}

impl<B: BadgeSurface> CartListener for BadgeRenderer<B> {
    fn cart_changed(&self, cart: &Cart) {
        self.refresh(cart);
    }
}

/// The cart engine
pub struct CartEngine<S> {
    store: S,
    config: CartConfig,
    listeners: RwLock<Vec<Arc<dyn CartListener>>>,
    write_lock: Mutex<()>,
}

impl<S> std::fmt::Debug for CartEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEngine")
            .field("config", &self.config)
            .field("listeners", &self.listeners.read().len())
            .finish_non_exhaustive()
    }
}

impl<S: CartStore> CartEngine<S> {
    /// Create engine over `store`
    #[inline]
    #[must_use]
    pub fn new(store: S, config: CartConfig) -> Self {
        Self {
            store,
            config,
            listeners: RwLock::new(Vec::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Register a change listener
    pub fn subscribe(&self, listener: Arc<dyn CartListener>) {
        self.listeners.write().push(listener);
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Current persisted cart
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.store.load()
    }

    /// Add one unit of `name`
    ///
    /// An existing line gains one unit and keeps its original price and id.
    ///
    /// # Errors
    /// - `CartError::InvalidItem` for a blank name, the reserved installation
    ///   name, or a negative price
    /// - `CartError::Store` if persisting fails
    pub fn add(&self, name: &str, price: Decimal, id: Option<i64>) -> Result<Cart, CartError> {
        if name.trim().is_empty() {
            return Err(CartError::InvalidItem("name is empty".to_string()));
        }
        if name == INSTALLATION_SERVICE {
            return Err(CartError::InvalidItem(format!(
                "{INSTALLATION_SERVICE} is managed by the upsell"
            )));
        }
        if price.is_sign_negative() {
            return Err(CartError::InvalidItem(format!("negative price for {name}")));
        }
        self.mutate("add", |cart| {
            cart.add(name, price, id);
            true
        })
    }

    /// Remove the line named `name` (persists even if absent)
    ///
    /// # Errors
    /// - `CartError::Store` if persisting fails
    pub fn remove(&self, name: &str) -> Result<Cart, CartError> {
        self.mutate("remove", |cart| {
            cart.remove(name);
            true
        })
    }

    /// Shift the quantity of `name` by `delta`; a result <= 0 removes it
    ///
    /// Unknown names leave the cart untouched and nothing is written. The
    /// installation add-on can only be removed this way, never increased.
    ///
    /// # Errors
    /// - `CartError::Store` if persisting fails
    pub fn set_quantity_delta(&self, name: &str, delta: i64) -> Result<Cart, CartError> {
        self.mutate("set_quantity_delta", |cart| cart.apply_delta(name, delta))
    }

    /// Replace the cart with an empty one
    ///
    /// # Errors
    /// - `CartError::Store` if persisting fails
    pub fn clear(&self) -> Result<Cart, CartError> {
        self.mutate("clear", |cart| {
            cart.clear();
            true
        })
    }

    /// Add the installation add-on at the configured price, quantity 1
    ///
    /// # Errors
    /// - `CartError::Store` if persisting fails
    pub fn upsert_installation(&self) -> Result<Cart, CartError> {
        let price = self.config.installation_price;
        self.mutate("upsert_installation", |cart| {
            cart.upsert_installation(price);
            true
        })
    }

    /// Drop the installation add-on if present
    ///
    /// # Errors
    /// - `CartError::Store` if persisting fails
    pub fn remove_installation(&self) -> Result<Cart, CartError> {
        self.remove(INSTALLATION_SERVICE)
    }

    /// Whether the installation add-on is in the cart
    #[must_use]
    pub fn has_installation(&self) -> bool {
        self.cart().has_installation()
    }

    /// Displayable items (installation excluded), insertion order
    #[must_use]
    pub fn display_items(&self) -> Vec<LineItem> {
        self.cart().display_items().cloned().collect()
    }

    /// Sum of `price * quantity` over `items`
    #[must_use]
    pub fn subtotal(items: &[LineItem]) -> Decimal {
        subtotal(items)
    }

    /// Sum of displayable quantities
    #[must_use]
    pub fn badge_count(&self) -> u32 {
        self.cart().badge_count()
    }

    /// Badge for the current cart
    #[must_use]
    pub fn badge(&self) -> BadgeState {
        BadgeState::from_count(self.badge_count())
    }

    /// "n items" label for the current cart
    #[must_use]
    pub fn item_label(&self) -> String {
        item_label(self.badge_count())
    }

    /// Subtotal over the full cart, installation included
    #[must_use]
    pub fn checkout_total(&self) -> Decimal {
        self.cart().checkout_subtotal()
    }

    /// Read-modify-write; `op` returns whether the cart should be written
    fn mutate<F>(&self, op: &'static str, f: F) -> Result<Cart, CartError>
    where
        F: FnOnce(&mut Cart) -> bool,
    {
        let _guard = self.write_lock.lock();
        let mut cart = self.store.load();
        if !f(&mut cart) {
            tracing::debug!(op, "cart unchanged");
            return Ok(cart);
        }
        self.store.save(&cart)?;
        tracing::debug!(op, lines = cart.len(), badge = cart.badge_count(), "cart saved");

        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            listener.cart_changed(&cart);
        }
        Ok(cart)
    }
}
