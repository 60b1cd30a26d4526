//! Host page contract
//!
//! Everything the controllers need from the page, expressed as traits so a
//! browser binding, a terminal front end or a test double can stand in.

use crate::content::{Markup, View};
use crate::error::UiError;
use loja_cart::{format_brl, item_label, BadgeSurface, Cart};

/// Page events a modal can route to its controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    /// "Clear cart" button
    ClearCart,
    /// Explicit close button
    CloseButton,
    /// Click on the backdrop outside the dialog body
    Backdrop,
    /// Escape key / native cancel
    Cancel,
    /// "Proceed to checkout" button
    ProceedToCheckout,
    /// "Add installation" button
    AcceptInstallation,
    /// "Skip installation" button
    SkipInstallation,
    /// Item-level +, - and remove buttons (delegated)
    ItemControls,
}

impl View {
    /// Listeners bound when this view's modal is first shown
    #[must_use]
    pub fn listeners(&self) -> &'static [Listener] {
        match self {
            Self::CartModal => &[
                Listener::ClearCart,
                Listener::CloseButton,
                Listener::Backdrop,
                Listener::Cancel,
                Listener::ProceedToCheckout,
                Listener::ItemControls,
            ],
            Self::InstallationModal => &[
                Listener::AcceptInstallation,
                Listener::SkipInstallation,
                Listener::CloseButton,
                Listener::Backdrop,
                Listener::Cancel,
            ],
            Self::InstallationService => &[],
        }
    }
}

/// Page operations shared by every modal
pub trait ModalHost: Send + Sync {
    /// Append `markup` for `view` into its fixed container
    ///
    /// # Errors
    /// - `UiError::MissingElement` if the container is absent
    fn attach(&self, view: View, markup: &Markup) -> Result<(), UiError>;

    /// Route `listeners` of `view` to the controller
    fn bind(&self, view: View, listeners: &[Listener]);

    /// Go to another page
    fn navigate(&self, route: &str);

    /// Ask a yes/no question
    fn confirm(&self, prompt: &str) -> bool;
}

/// Cart modal specific page operations
pub trait CartSurface: ModalHost + BadgeSurface {
    /// Redraw the cart modal body
    fn render_cart(&self, view: &CartView);
}

/// One rendered cart row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
    /// Item name
    pub name: String,
    /// Formatted unit price
    pub unit_price: String,
    /// Quantity
    pub quantity: u32,
    /// Formatted `price * quantity`
    pub line_total: String,
}

/// Empty-state block shown instead of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    /// Icon identifier
    pub icon: &'static str,
    /// Heading
    pub title: &'static str,
    /// Hint under the heading
    pub hint: &'static str,
}

impl Default for EmptyState {
    fn default() -> Self {
        Self {
            icon: "shopping-bag",
            title: "Your cart is empty",
            hint: "Add some products to get started!",
        }
    }
}

/// Render model of the cart modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    /// Displayable rows, installation excluded
    pub rows: Vec<CartRow>,
    /// Set when there is nothing to display
    pub empty_state: Option<EmptyState>,
    /// Formatted displayable subtotal
    pub total: String,
    /// "n items" label
    pub item_label: String,
    /// Whether proceed-to-checkout is enabled (dimmed otherwise)
    pub checkout_enabled: bool,
}

impl CartView {
    /// Project `cart` into a render model
    #[must_use]
    pub fn from_cart(cart: &Cart) -> Self {
        let rows: Vec<CartRow> = cart
            .display_items()
            .map(|item| CartRow {
                name: item.name.clone(),
                unit_price: format_brl(item.price),
                quantity: item.quantity,
                line_total: format_brl(item.line_total()),
            })
            .collect();
        let empty = rows.is_empty();

        Self {
            rows,
            empty_state: empty.then(EmptyState::default),
            total: format_brl(cart.display_subtotal()),
            item_label: item_label(cart.badge_count()),
            checkout_enabled: !empty,
        }
    }
}
