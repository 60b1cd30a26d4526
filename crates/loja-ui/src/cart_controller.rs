//! Cart modal controller
//!
//! Projects the engine into the cart modal and turns page events into cart
//! operations. Every mutation re-renders the modal; the badge follows the
//! engine through a subscribed [`BadgeRenderer`].

use crate::config::UiConfig;
use crate::content::{PartialContentProvider, View};
use crate::dialog::AnimatedDialog;
use crate::error::UiError;
use crate::host::{CartSurface, CartView, ModalHost};
use crate::modal::Modal;
use crate::upsell::{InstallationUpsell, UpsellSession, UpsellTarget};
use loja_cart::{BadgeRenderer, BadgeSurface, Cart, CartEngine, CartStore};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Events coming from the cart modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// "+" on a row
    Increase(String),
    /// "-" on a row
    Decrease(String),
    /// Remove button on a row
    Remove(String),
    /// "Clear cart" (asks for confirmation)
    Clear,
    /// Close button
    Close,
    /// Backdrop click
    Backdrop,
    /// Escape / native cancel
    Cancel,
    /// "Proceed to checkout"
    ProceedToCheckout,
}

/// What handling an action led to
pub enum CartOutcome<S> {
    /// Cart changed and the modal was redrawn
    Rerendered(Cart),
    /// Cart was cleared after confirmation
    Cleared,
    /// Modal was closed
    Closed,
    /// Nothing to do (declined prompt, empty cart on checkout)
    Ignored,
    /// Upsell modal is open and waiting for a decision
    UpsellOpened(UpsellSession<S>),
    /// Upsell unavailable; went straight to checkout
    Navigated(String),
}

impl<S> fmt::Debug for CartOutcome<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rerendered(cart) => f.debug_tuple("Rerendered").field(cart).finish(),
            Self::Cleared => f.write_str("Cleared"),
            Self::Closed => f.write_str("Closed"),
            Self::Ignored => f.write_str("Ignored"),
            Self::UpsellOpened(session) => f.debug_tuple("UpsellOpened").field(session).finish(),
            Self::Navigated(route) => f.debug_tuple("Navigated").field(route).finish(),
        }
    }
}

/// Cart modal controller
pub struct CartController<S> {
    engine: Arc<CartEngine<S>>,
    provider: Arc<dyn PartialContentProvider>,
    surface: Arc<dyn CartSurface>,
    host: Arc<dyn ModalHost>,
    modal: Modal<Arc<dyn AnimatedDialog>>,
    upsell: Arc<InstallationUpsell<S>>,
    config: UiConfig,
}

impl<S> fmt::Debug for CartController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartController")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: CartStore + 'static> CartController<S> {
    /// Wire the controller to a page
    ///
    /// Subscribes a badge renderer on `host` and draws the badge once.
    pub fn new<H: CartSurface + 'static>(
        engine: Arc<CartEngine<S>>,
        provider: Arc<dyn PartialContentProvider>,
        host: Arc<H>,
        cart_dialog: Arc<dyn AnimatedDialog>,
        upsell: Arc<InstallationUpsell<S>>,
        config: UiConfig,
    ) -> Self {
        let badge_surface: Arc<dyn BadgeSurface> = host.clone();
        let badge = Arc::new(BadgeRenderer::new(badge_surface));
        badge.refresh(&engine.cart());
        engine.subscribe(badge);

        Self {
            engine,
            provider,
            surface: host.clone(),
            host,
            modal: Modal::new(View::CartModal, cart_dialog),
            upsell,
            config,
        }
    }

    /// The cart modal
    #[inline]
    #[must_use]
    pub fn modal(&self) -> &Modal<Arc<dyn AnimatedDialog>> {
        &self.modal
    }

    /// The upsell flow this controller hands off to
    #[inline]
    #[must_use]
    pub fn upsell(&self) -> &Arc<InstallationUpsell<S>> {
        &self.upsell
    }

    /// Redraw the modal body from the persisted cart
    pub fn render(&self) -> CartView {
        let view = CartView::from_cart(&self.engine.cart());
        self.surface.render_cart(&view);
        view
    }

    /// Mount if needed, render, then open
    ///
    /// # Errors
    /// - `UiError::NotLoaded` if the modal markup could not be fetched
    pub async fn show(&self) -> Result<(), UiError> {
        self.modal
            .ensure_mounted(self.provider.as_ref(), self.host.as_ref())
            .await?;
        self.modal.ensure_bound(self.host.as_ref()).await?;
        self.render();
        self.modal.open().await;
        Ok(())
    }

    /// Close the modal
    pub async fn hide(&self) {
        self.modal.close().await;
    }

    /// Add one unit of a product and show the cart
    ///
    /// # Errors
    /// - `UiError::Cart` if the item is invalid or cannot be written
    /// - `UiError::NotLoaded` if the modal markup could not be fetched
    pub async fn add_and_show(
        &self,
        name: &str,
        price: Decimal,
        id: Option<i64>,
    ) -> Result<(), UiError> {
        self.engine.add(name, price, id)?;
        self.show().await
    }

    /// Handle one modal event
    ///
    /// # Errors
    /// - `UiError::Cart` if a mutation cannot be written
    pub async fn dispatch(&self, action: CartAction) -> Result<CartOutcome<S>, UiError> {
        tracing::debug!(?action, "cart action");
        match action {
            CartAction::Increase(name) => self.apply(|e| e.set_quantity_delta(&name, 1)),
            CartAction::Decrease(name) => self.apply(|e| e.set_quantity_delta(&name, -1)),
            CartAction::Remove(name) => self.apply(|e| e.remove(&name)),
            CartAction::Clear => {
                if !self.host.confirm(&self.config.clear_prompt) {
                    return Ok(CartOutcome::Ignored);
                }
                self.engine.clear()?;
                self.render();
                Ok(CartOutcome::Cleared)
            }
            CartAction::Close | CartAction::Backdrop | CartAction::Cancel => {
                self.hide().await;
                Ok(CartOutcome::Closed)
            }
            CartAction::ProceedToCheckout => self.proceed_to_checkout().await,
        }
    }

    async fn proceed_to_checkout(&self) -> Result<CartOutcome<S>, UiError> {
        if self.engine.cart().is_display_empty() {
            return Ok(CartOutcome::Ignored);
        }

        self.hide().await;
        let route = self.config.checkout_route.clone();
        match self
            .upsell
            .begin(UpsellTarget::Navigate(route.clone()))
            .await
        {
            Ok(session) => Ok(CartOutcome::UpsellOpened(session)),
            Err(error) if error.is_not_loaded() => {
                tracing::warn!(%error, "upsell unavailable, going to checkout");
                self.host.navigate(&route);
                Ok(CartOutcome::Navigated(route))
            }
            Err(error) => Err(error),
        }
    }

    fn apply<F>(&self, op: F) -> Result<CartOutcome<S>, UiError>
    where
        F: FnOnce(&CartEngine<S>) -> Result<Cart, loja_cart::CartError>,
    {
        let cart = op(&self.engine)?;
        self.surface.render_cart(&CartView::from_cart(&cart));
        Ok(CartOutcome::Rerendered(cart))
    }
}
