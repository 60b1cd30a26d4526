//! Installation upsell
//!
//! A one-decision modal shown before checkout. Each invocation gets a fresh
//! [`UpsellSession`] whose decision moves `Pending` -> `Decided` exactly once;
//! every action after the first is ignored. A decision whose cart write
//! fails goes back to `Pending` so the modal still answers.

use crate::content::{PartialContentProvider, View};
use crate::dialog::AnimatedDialog;
use crate::error::UiError;
use crate::host::ModalHost;
use crate::modal::Modal;
use loja_cart::{Cart, CartEngine, CartStore};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// User actions available in the upsell modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpsellAction {
    /// "Add installation"
    Add,
    /// "No thanks"
    Skip,
    /// Close button
    Close,
    /// Backdrop click
    Backdrop,
    /// Escape / native cancel
    Cancel,
}

impl UpsellAction {
    /// Whether this action accepts the installation
    #[inline]
    #[must_use]
    pub fn accepts(self) -> bool {
        matches!(self, Self::Add)
    }
}

/// Decision state of one upsell invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionState {
    /// Waiting for the user
    Pending,
    /// Settled; `true` means accepted
    Decided(bool),
}

/// One-shot decision latch
#[derive(Debug)]
pub struct UpsellDecision {
    state: Mutex<DecisionState>,
}

impl UpsellDecision {
    /// Create a pending decision
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DecisionState::Pending),
        }
    }

    /// Settle the decision; `None` if it was already settled
    pub fn decide(&self, accepted: bool) -> Option<bool> {
        let mut state = self.state.lock();
        match *state {
            DecisionState::Pending => {
                *state = DecisionState::Decided(accepted);
                Some(accepted)
            }
            DecisionState::Decided(_) => None,
        }
    }

    /// Undo a settled decision that could not be applied
    pub fn reopen(&self) {
        *self.state.lock() = DecisionState::Pending;
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> DecisionState {
        *self.state.lock()
    }
}

impl Default for UpsellDecision {
    fn default() -> Self {
        Self::new()
    }
}

/// Something that redraws an order summary in place
pub trait SummaryRefresh: Send + Sync {
    /// Redraw for `cart`
    fn refresh_summary(&self, cart: &Cart);
}

/// Where the flow goes once decided
#[derive(Clone)]
pub enum UpsellTarget {
    /// Navigate to a route (cart modal variant)
    Navigate(String),
    /// Re-render a summary without leaving the page (checkout variant)
    Rerender(Arc<dyn SummaryRefresh>),
}

impl fmt::Debug for UpsellTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigate(route) => f.debug_tuple("Navigate").field(route).finish(),
            Self::Rerender(_) => f.write_str("Rerender"),
        }
    }
}

/// Result of a settled decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsellOutcome {
    /// Whether the installation was accepted
    pub accepted: bool,
    /// Cart after the decision was applied
    pub cart: Cart,
}

/// The upsell modal and the cart it mutates
pub struct InstallationUpsell<S> {
    engine: Arc<CartEngine<S>>,
    provider: Arc<dyn PartialContentProvider>,
    host: Arc<dyn ModalHost>,
    modal: Modal<Arc<dyn AnimatedDialog>>,
}

impl<S> fmt::Debug for InstallationUpsell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallationUpsell").finish_non_exhaustive()
    }
}

impl<S: CartStore> InstallationUpsell<S> {
    /// Create the flow; the modal mounts on first use
    #[must_use]
    pub fn new(
        engine: Arc<CartEngine<S>>,
        provider: Arc<dyn PartialContentProvider>,
        host: Arc<dyn ModalHost>,
        dialog: Arc<dyn AnimatedDialog>,
    ) -> Self {
        Self {
            engine,
            provider,
            host,
            modal: Modal::new(View::InstallationModal, dialog),
        }
    }

    /// The upsell modal
    #[inline]
    #[must_use]
    pub fn modal(&self) -> &Modal<Arc<dyn AnimatedDialog>> {
        &self.modal
    }

    /// Open the modal and start a fresh decision
    ///
    /// The service details are loaded best-effort; the decision works
    /// without them.
    ///
    /// # Errors
    /// - `UiError::NotLoaded` if the modal markup could not be fetched
    pub async fn begin(self: &Arc<Self>, target: UpsellTarget) -> Result<UpsellSession<S>, UiError> {
        self.modal
            .show(self.provider.as_ref(), self.host.as_ref())
            .await?;

        match self.provider.fetch(View::InstallationService).await {
            Ok(markup) => {
                if let Err(error) = self.host.attach(View::InstallationService, &markup) {
                    tracing::warn!(%error, "installation details not shown");
                }
            }
            Err(error) => tracing::warn!(%error, "installation details not loaded"),
        }

        tracing::debug!(?target, "upsell opened");
        Ok(UpsellSession {
            upsell: Arc::clone(self),
            decision: UpsellDecision::new(),
            target,
        })
    }
}

/// One invocation of the upsell
pub struct UpsellSession<S> {
    upsell: Arc<InstallationUpsell<S>>,
    decision: UpsellDecision,
    target: UpsellTarget,
}

impl<S> fmt::Debug for UpsellSession<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpsellSession")
            .field("decision", &self.decision)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<S: CartStore> UpsellSession<S> {
    /// Current decision state
    #[must_use]
    pub fn state(&self) -> DecisionState {
        self.decision.state()
    }

    /// Apply `action`; `Ok(None)` if a decision was already made
    ///
    /// # Errors
    /// - `UiError::Cart` if the cart could not be written; the modal stays
    ///   open and the decision pending
    pub async fn choose(&self, action: UpsellAction) -> Result<Option<UpsellOutcome>, UiError> {
        let Some(accepted) = self.decision.decide(action.accepts()) else {
            tracing::debug!(?action, "upsell already decided");
            return Ok(None);
        };

        let engine = &self.upsell.engine;
        let written = if accepted {
            engine.upsert_installation()
        } else {
            engine.remove_installation()
        };
        let cart = match written {
            Ok(cart) => cart,
            Err(error) => {
                self.decision.reopen();
                tracing::warn!(%error, accepted, "installation decision not saved");
                return Err(error.into());
            }
        };
        tracing::info!(accepted, "installation decision");

        self.upsell.modal.close().await;
        match &self.target {
            UpsellTarget::Navigate(route) => self.upsell.host.navigate(route),
            UpsellTarget::Rerender(summary) => summary.refresh_summary(&cart),
        }

        Ok(Some(UpsellOutcome { accepted, cart }))
    }
}
