//! Loja Cart - persistent shopping cart
//!
//! The cart is a list of line items kept in one durable key/value slot:
//! - Every mutation reads the whole cart and writes the whole cart back
//! - At most one line item per name, quantities always >= 1
//! - The "Installation Service" line is a synthetic add-on that badges and
//!   cart subtotals leave out but the checkout total includes
//!
//! # Example
//!
//! ```rust,ignore
//! use loja_cart::{CartConfig, CartEngine, JsonCartStore, MemoryBackend};
//! use rust_decimal::Decimal;
//!
//! let store = JsonCartStore::new(MemoryBackend::new(), "cart");
//! let engine = CartEngine::new(store, CartConfig::default());
//!
//! engine.add("Filter A", Decimal::new(4990, 2), None)?;
//! engine.add("Filter A", Decimal::new(4990, 2), None)?;
//! assert_eq!(engine.badge_count(), 2);
//! ```

#![warn(unreachable_pub)]

pub mod engine;
pub mod error;
pub mod line_item;
pub mod money;
pub mod store;

pub use engine::{BadgeRenderer, BadgeState, BadgeSurface, CartConfig, CartEngine, CartListener};
pub use error::{CartError, StoreError};
pub use line_item::{item_label, subtotal, Cart, CartShapeError, LineItem, INSTALLATION_SERVICE};
pub use money::{format_amount, format_brl};
pub use store::{CartStore, FileBackend, JsonCartStore, MemoryBackend, StorageBackend};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the cart
    pub use crate::{
        BadgeState, Cart, CartConfig, CartEngine, CartError, CartStore, JsonCartStore, LineItem,
        StorageBackend, INSTALLATION_SERVICE,
    };
    pub use rust_decimal::Decimal;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
