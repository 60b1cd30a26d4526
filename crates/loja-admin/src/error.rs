//! Error types for the admin client

/// Admin console errors
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Form rejected before sending
    #[error("invalid form: {0}")]
    Invalid(String),

    /// Image attachment could not be prepared
    #[error("image attachment failed: {0}")]
    Image(String),

    /// Transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("admin api returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, usually the server's message
        body: String,
    },
}

impl AdminError {
    /// Check if the target product or order does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// Check if the session lacks the required role
    #[inline]
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// Server message to show the operator, if any
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } if !body.trim().is_empty() => Some(body.trim()),
            _ => None,
        }
    }
}
