//! Field validators
//!
//! Each validator answers one yes/no question about a raw input value.
//! Messages and required-ness live in [`crate::form`].

use crate::format::digits_only;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid pattern")
});

static EXPIRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})/(\d{2})$").expect("valid pattern"));

static CEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}-?\d{3}$").expect("valid pattern"));

static CVV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3,4}$").expect("valid pattern"));

/// `local@domain.tld` shape
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

/// At least 10 digits once formatting is stripped
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    digits_only(phone).len() >= 10
}

/// Luhn checksum over 13 to 19 digits
///
/// Spaces and dashes are ignored; any other character fails.
#[must_use]
pub fn is_valid_card_number(card: &str) -> bool {
    let cleaned: String = card.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    if !(13..=19).contains(&cleaned.len()) || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = cleaned
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

/// Strict `MM/YY`, month 1..=12, not before the month of `today`
#[must_use]
pub fn is_valid_expiry(expiry: &str, today: NaiveDate) -> bool {
    let Some(caps) = EXPIRY.captures(expiry.trim()) else {
        return false;
    };
    let (Ok(month), Ok(yy)) = (caps[1].parse::<u32>(), caps[2].parse::<i32>()) else {
        return false;
    };
    if !(1..=12).contains(&month) {
        return false;
    }

    let year = 2000 + yy;
    (year, month) >= (today.year(), today.month())
}

/// 3 or 4 digits
#[must_use]
pub fn is_valid_cvv(cvv: &str) -> bool {
    CVV.is_match(cvv.trim())
}

/// 11 (CPF) or 14 (CNPJ) digits
#[must_use]
pub fn is_valid_cpf_cnpj(value: &str) -> bool {
    matches!(digits_only(value).len(), 11 | 14)
}

/// `00000-000` or `00000000`
#[must_use]
pub fn is_valid_cep(cep: &str) -> bool {
    CEP.is_match(cep.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 15).unwrap()
    }

    #[test]
    fn luhn_known_numbers() {
        assert!(is_valid_card_number("4532015112830366"));
        assert!(is_valid_card_number("4532 0151 1283 0366"));
        assert!(!is_valid_card_number("4532015112830367"));
        assert!(!is_valid_card_number("4532"));
        assert!(!is_valid_card_number("4532x15112830366"));
    }

    #[test]
    fn expiry_relative_to_current_month() {
        let today = date(2026, 10);
        assert!(is_valid_expiry("10/26", today));
        assert!(is_valid_expiry("01/27", today));
        assert!(!is_valid_expiry("09/26", today));
        assert!(!is_valid_expiry("13/30", today));
        assert!(!is_valid_expiry("00/30", today));
        assert!(!is_valid_expiry("1/30", today));
        assert!(!is_valid_expiry("1230", today));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("ana@loja.com.br"));
        assert!(!is_valid_email("ana@loja"));
        assert!(!is_valid_email("ana loja@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn phone_digit_count() {
        assert!(is_valid_phone("(67) 99999-0000"));
        assert!(!is_valid_phone("9999-0000"));
    }

    #[test]
    fn cvv_cpf_cep() {
        assert!(is_valid_cvv("123"));
        assert!(is_valid_cvv("1234"));
        assert!(!is_valid_cvv("12a"));
        assert!(is_valid_cpf_cnpj("123.456.789-09"));
        assert!(is_valid_cpf_cnpj("11.222.333/0001-81"));
        assert!(!is_valid_cpf_cnpj("1234567890"));
        assert!(is_valid_cep("79002-170"));
        assert!(is_valid_cep("79002170"));
        assert!(!is_valid_cep("7900-2170"));
    }

    proptest! {
        #[test]
        fn prop_single_digit_change_breaks_luhn(pos in 0usize..16, bump in 1u8..10) {
            let mut bytes = b"4532015112830366".to_vec();
            bytes[pos] = b'0' + (bytes[pos] - b'0' + bump) % 10;
            let mutated = String::from_utf8(bytes).unwrap();
            prop_assert!(!is_valid_card_number(&mutated));
        }
    }
}
