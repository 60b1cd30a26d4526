//! Error types for the cart
//!
//! Reads never fail: an unreadable or malformed slot is an empty cart.
//! Only writes and invalid mutations surface errors.

use std::path::PathBuf;

/// Storage backend errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO failure on a file-backed slot
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Key cannot be mapped to a slot
    #[error("invalid storage key: '{0}'")]
    InvalidKey(String),

    /// Cart could not be encoded
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Backend refused the write (quota, read-only, ...)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if a retry could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Unavailable(_))
    }
}

/// Cart engine errors
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// Persisting the cart failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Line item rejected before touching the cart
    #[error("invalid item: {0}")]
    InvalidItem(String),
}
