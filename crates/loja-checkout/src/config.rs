//! Checkout configuration

use crate::address::ServiceArea;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Checkout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// The only city/state orders are accepted from
    pub service_area: ServiceArea,
    /// Flat shipping fee, charged when the cart is non-empty
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    /// Tax rate over the item subtotal
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate: Decimal,
    /// Address lookup service base URL
    pub lookup_base_url: String,
    /// Order placement endpoint
    pub order_endpoint: String,
}

impl CheckoutConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With service area
    #[inline]
    #[must_use]
    pub fn with_service_area(mut self, area: ServiceArea) -> Self {
        self.service_area = area;
        self
    }

    /// With shipping fee
    #[inline]
    #[must_use]
    pub fn with_shipping(mut self, shipping: Decimal) -> Self {
        self.shipping = shipping;
        self
    }

    /// With tax rate
    #[inline]
    #[must_use]
    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// With order endpoint
    #[inline]
    #[must_use]
    pub fn with_order_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.order_endpoint = endpoint.into();
        self
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            service_area: ServiceArea::default(),
            shipping: Decimal::new(1000, 2),
            tax_rate: Decimal::new(8, 2),
            lookup_base_url: "https://viacep.com.br/ws".to_string(),
            order_endpoint: "http://localhost:8080/api/checkout".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_storefront() {
        let config = CheckoutConfig::default();
        assert_eq!(config.shipping, Decimal::new(10, 0));
        assert_eq!(config.tax_rate, Decimal::new(8, 2));
        assert_eq!(config.service_area.city, "Campo Grande");
    }

    #[test]
    fn amounts_read_as_plain_numbers() {
        let config: CheckoutConfig = serde_json::from_str(r#"{"shipping": 15.5}"#).unwrap();
        assert_eq!(config.shipping, Decimal::new(155, 1));
        assert_eq!(config.tax_rate, Decimal::new(8, 2));
    }
}
