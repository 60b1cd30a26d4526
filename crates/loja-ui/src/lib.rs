//! Loja UI - cart modal and installation upsell
//!
//! Drives the page around the cart engine without knowing how the page is
//! drawn:
//! - [`PartialContentProvider`] supplies server-rendered modal markup
//! - [`AnimatedDialog`] opens and closes dialogs with transitions
//! - [`CartSurface`] / [`ModalHost`] are the page operations the controllers call
//!
//! [`CartController`] renders the cart and hands off to
//! [`InstallationUpsell`] when the user proceeds to checkout.

#![warn(unreachable_pub)]

pub mod cart_controller;
pub mod config;
pub mod content;
pub mod dialog;
pub mod error;
pub mod host;
pub mod modal;
pub mod upsell;

pub use cart_controller::{CartAction, CartController, CartOutcome};
pub use config::{PartialPaths, UiConfig};
pub use content::{CachedContentProvider, HttpContentProvider, Markup, PartialContentProvider, View};
pub use dialog::{AnimatedDialog, DialogSurface, TimedDialog};
pub use error::{ContentError, UiError};
pub use host::{CartRow, CartSurface, CartView, EmptyState, Listener, ModalHost};
pub use modal::{allowed_transitions, validate_transition, Modal, ModalState};
pub use upsell::{
    DecisionState, InstallationUpsell, SummaryRefresh, UpsellAction, UpsellDecision, UpsellOutcome,
    UpsellSession, UpsellTarget,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
