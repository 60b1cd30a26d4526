//! Error types for checkout
//!
//! Validation failures are not errors: they come back as `FieldError` data.
//! What lives here is what can go wrong talking to collaborators.

use crate::form::FieldError;
use loja_cart::CartError;
use loja_ui::UiError;

/// Address lookup errors
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Postal code does not have 8 digits
    #[error("invalid postal code: {0}")]
    InvalidCode(String),

    /// Service flagged the code as unknown
    #[error("postal code not found: {0}")]
    NotFound(String),

    /// Transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status
    #[error("lookup service returned {0}")]
    Status(u16),
}

impl LookupError {
    /// Check if the code itself is unknown
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidCode(_))
    }
}

/// Order submission errors
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// Transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server refused the order
    #[error("order endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Server refused the order on one field
    #[error("order rejected on {}: {}", .0.field, .0.message)]
    Rejected(FieldError),

    /// Cart could not be encoded for the request
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SubmitError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Rejected(_) | Self::Encode(_) => false,
        }
    }
}

/// Checkout controller errors
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Cart could not be read or written
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// Upsell flow failed
    #[error("upsell error: {0}")]
    Ui(#[from] UiError),
}
