//! Order status and the order list filter

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fulfilment status of an order; new orders start as `Pending`
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in workflow order
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire value
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// Filter for the order list; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Fulfilment status
    pub status: Option<OrderStatus>,
    /// Payment status as the payment provider reports it
    pub payment_status: Option<String>,
}

impl OrderFilter {
    /// Match every order
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only orders with `status`
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Only orders with `payment_status`
    #[inline]
    #[must_use]
    pub fn with_payment_status(mut self, payment_status: impl Into<String>) -> Self {
        self.payment_status = Some(payment_status.into());
        self
    }

    /// Query parameters; both are always sent, empty when unset
    #[must_use]
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            (
                "status",
                self.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            ),
            (
                "payment_status",
                self.payment_status.clone().unwrap_or_default(),
            ),
        ]
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdate {
    pub(crate) status: OrderStatus,
}
