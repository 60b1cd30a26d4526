//! Currency display helpers
//!
//! Amounts stay exact `Decimal`s while summing; rounding happens here only.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol used in rendered amounts
pub const CURRENCY_SYMBOL: &str = "R$";

/// Format an amount with exactly two decimal places (half away from zero)
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Format an amount with the currency symbol, e.g. `R$ 49.90`
#[must_use]
pub fn format_brl(amount: Decimal) -> String {
    format!("{CURRENCY_SYMBOL} {}", format_amount(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pads_to_two_places() {
        assert_eq!(format_amount(Decimal::new(120, 0)), "120.00");
        assert_eq!(format_amount(Decimal::new(499, 1)), "49.90");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let amount = Decimal::from_str("10.005").unwrap();
        assert_eq!(format_amount(amount), "10.01");
    }

    #[test]
    fn brl_prefix() {
        assert_eq!(format_brl(Decimal::new(9980, 2)), "R$ 99.80");
    }
}
