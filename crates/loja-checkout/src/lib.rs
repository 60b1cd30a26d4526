//! Loja Checkout - the checkout page
//!
//! - [`format`] and [`validate`] shape and check field input
//! - [`AddressLookup`] resolves postal codes; [`ServiceArea`] limits where we deliver
//! - [`CheckoutSummary`] prices the cart with shipping and tax
//! - [`CheckoutController`] ties them to the page and places the order
//!
//! Validation messages are in Portuguese, as shown to customers.

#![warn(unreachable_pub)]

pub mod address;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod format;
pub mod order_ref;
pub mod submit;
pub mod summary;
pub mod validate;

pub use address::{AddressInfo, AddressLookup, ServiceArea, ViaCepClient};
pub use config::CheckoutConfig;
pub use controller::{
    CheckoutController, CheckoutSurface, PostalCodeOutcome, SubmitOutcome, SummaryRenderer,
};
pub use error::{CheckoutError, LookupError, SubmitError};
pub use form::{CheckoutForm, Field, FieldError, PaymentMethod};
pub use order_ref::OrderReference;
pub use submit::{
    parse_rejection, HttpOrderSubmitter, OrderRequest, OrderSubmitter, PaymentRedirect,
};
pub use summary::{CheckoutSummary, SummaryRow};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
