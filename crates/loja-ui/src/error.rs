//! Error types for the presentation layer
//!
//! Nothing here is fatal to the page:
//! - Content load failures leave the modal "not loaded"
//! - Missing host elements disable the feature
//! - Cart write failures bubble up from the engine

use crate::content::View;
use crate::modal::ModalState;
use loja_cart::CartError;

/// Partial content fetch errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server returned {status} for {view:?}")]
    Status { view: View, status: u16 },

    /// Server answered with no markup
    #[error("empty markup for {0:?}")]
    Empty(View),
}

impl ContentError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Empty(_) => false,
        }
    }
}

/// Presentation errors
#[derive(Debug, thiserror::Error)]
pub enum UiError {
    /// Modal markup could not be loaded; the modal stays unmounted
    #[error("{view:?} not loaded: {source}")]
    NotLoaded {
        view: View,
        #[source]
        source: ContentError,
    },

    /// Host page lacks an element the feature needs
    #[error("missing host element: {0}")]
    MissingElement(String),

    /// Modal lifecycle transition not allowed
    #[error("illegal modal transition: {from:?} -> {to:?}")]
    IllegalTransition { from: ModalState, to: ModalState },

    /// Cart mutation failed
    #[error("cart error: {0}")]
    Cart(#[from] CartError),
}

impl UiError {
    /// Whether the failure came from loading content
    #[inline]
    #[must_use]
    pub fn is_not_loaded(&self) -> bool {
        matches!(self, Self::NotLoaded { .. })
    }
}
