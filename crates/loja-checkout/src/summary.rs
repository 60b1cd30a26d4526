//! Order summary shown beside the checkout form

use crate::config::CheckoutConfig;
use loja_cart::{format_brl, Cart};
use rust_decimal::Decimal;

/// One summary row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// Item name
    pub name: String,
    /// Quantity; `None` for flat-fee rows
    pub quantity: Option<u32>,
    /// Line amount
    pub amount: Decimal,
}

/// Totals of an order about to be placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    /// Every cart line, installation shown as a flat fee
    pub rows: Vec<SummaryRow>,
    /// Sum of all lines, installation included
    pub subtotal: Decimal,
    /// Flat shipping; zero for an empty cart
    pub shipping: Decimal,
    /// Tax over `subtotal`
    pub tax: Decimal,
    /// `subtotal + shipping + tax`
    pub total: Decimal,
}

impl CheckoutSummary {
    /// Summarize `cart` under `config`
    #[must_use]
    pub fn from_cart(cart: &Cart, config: &CheckoutConfig) -> Self {
        let rows = cart
            .items()
            .map(|item| SummaryRow {
                name: item.name.clone(),
                quantity: (!item.is_installation()).then_some(item.quantity),
                amount: item.line_total(),
            })
            .collect();

        let subtotal = cart.checkout_subtotal();
        let shipping = if cart.is_empty() {
            Decimal::ZERO
        } else {
            config.shipping
        };
        let tax = subtotal * config.tax_rate;

        Self {
            rows,
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Whether the place-order control should be enabled
    #[inline]
    #[must_use]
    pub fn can_place_order(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Formatted `(subtotal, shipping, tax, total)`
    #[must_use]
    pub fn formatted_totals(&self) -> [String; 4] {
        [
            format_brl(self.subtotal),
            format_brl(self.shipping),
            format_brl(self.tax),
            format_brl(self.total),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loja_cart::INSTALLATION_SERVICE;

    #[test]
    fn empty_cart_has_no_shipping() {
        let summary = CheckoutSummary::from_cart(&Cart::new(), &CheckoutConfig::default());
        assert_eq!(summary.total, Decimal::ZERO);
        assert!(!summary.can_place_order());
    }

    #[test]
    fn totals_include_installation_flat_fee() {
        let mut cart = Cart::new();
        cart.add("Filter A", Decimal::new(4990, 2), None);
        cart.add("Filter A", Decimal::new(4990, 2), None);
        cart.upsert_installation(Decimal::new(12000, 2));

        let summary = CheckoutSummary::from_cart(&cart, &CheckoutConfig::default());
        assert_eq!(summary.subtotal, Decimal::new(21980, 2));
        assert_eq!(summary.shipping, Decimal::new(1000, 2));
        assert_eq!(summary.tax, Decimal::new(175840, 4));

        let installation = summary
            .rows
            .iter()
            .find(|row| row.name == INSTALLATION_SERVICE)
            .unwrap();
        assert_eq!(installation.quantity, None);
        assert_eq!(installation.amount, Decimal::new(12000, 2));

        assert_eq!(
            summary.formatted_totals(),
            [
                "R$ 219.80".to_string(),
                "R$ 10.00".to_string(),
                "R$ 17.58".to_string(),
                "R$ 247.38".to_string(),
            ]
        );
    }
}
