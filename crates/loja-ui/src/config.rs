//! Presentation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Presentation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Delay between showing a dialog and applying its visible style
    pub open_delay_ms: u64,
    /// Delay between removing the visible style and closing the dialog
    pub close_delay_ms: u64,
    /// Route of the checkout page
    pub checkout_route: String,
    /// Server serving partial markup
    pub base_url: String,
    /// Partial paths, relative to `base_url`
    pub partials: PartialPaths,
    /// Confirmation shown before clearing the cart
    pub clear_prompt: String,
}

impl UiConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With animation delays
    #[inline]
    #[must_use]
    pub fn with_delays(mut self, open: Duration, close: Duration) -> Self {
        self.open_delay_ms = u64::try_from(open.as_millis()).unwrap_or(u64::MAX);
        self.close_delay_ms = u64::try_from(close.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Open delay
    #[inline]
    #[must_use]
    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }

    /// Close delay
    #[inline]
    #[must_use]
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            open_delay_ms: 10,
            close_delay_ms: 300,
            checkout_route: "/checkout".to_string(),
            base_url: "http://localhost:8080".to_string(),
            partials: PartialPaths::default(),
            clear_prompt: "Are you sure you want to clear your cart?".to_string(),
        }
    }
}

/// Server paths of each partial view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialPaths {
    /// Cart modal markup
    pub cart_modal: String,
    /// Installation upsell modal markup
    pub installation_modal: String,
    /// Installation service details
    pub installation_service: String,
}

impl Default for PartialPaths {
    fn default() -> Self {
        Self {
            cart_modal: "/cart-modal".to_string(),
            installation_modal: "/installation-service-modal".to_string(),
            installation_service: "/installation-service".to_string(),
        }
    }
}
