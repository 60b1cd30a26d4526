//! Input formatters
//!
//! Pure string transforms applied on every input event. They accept
//! anything the user typed and return the canonical display form.

/// Keep ASCII digits only
#[must_use]
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Card number in 4-digit blocks, at most 16 digits
///
/// ```
/// use loja_checkout::format::format_card_number;
/// assert_eq!(format_card_number("4532015112830366"), "4532 0151 1283 0366");
/// ```
#[must_use]
pub fn format_card_number(value: &str) -> String {
    let digits: String = digits_only(value).chars().take(16).collect();
    digits
        .as_bytes()
        .chunks(4)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Expiry as `MM/YY`
///
/// The slash appears as soon as two digits are typed.
#[must_use]
pub fn format_expiry(value: &str) -> String {
    let digits = digits_only(value);
    if digits.len() < 2 {
        return digits;
    }
    let year: String = digits.chars().skip(2).take(2).collect();
    format!("{}/{year}", &digits[..2])
}

/// CPF (`000.000.000-00`) or CNPJ (`00.000.000/0000-00`)
///
/// Partial input is returned as bare digits until it is complete.
#[must_use]
pub fn format_cpf_cnpj(value: &str) -> String {
    let digits = digits_only(value);
    match digits.len() {
        11 => format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        ),
        n if n >= 14 => format!(
            "{}.{}.{}/{}-{}",
            &digits[..2],
            &digits[2..5],
            &digits[5..8],
            &digits[8..12],
            &digits[12..14]
        ),
        _ => digits,
    }
}

/// Postal code (CEP) as `00000-000`
#[must_use]
pub fn format_cep(value: &str) -> String {
    let digits: String = digits_only(value).chars().take(8).collect();
    if digits.len() <= 5 {
        return digits;
    }
    format!("{}-{}", &digits[..5], &digits[5..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_groups_and_truncates() {
        assert_eq!(format_card_number("4532-0151 1283"), "4532 0151 1283");
        assert_eq!(format_card_number("45320151128303661234"), "4532 0151 1283 0366");
        assert_eq!(format_card_number("45"), "45");
        assert_eq!(format_card_number("ab"), "");
    }

    #[test]
    fn expiry_inserts_slash() {
        assert_eq!(format_expiry("1"), "1");
        assert_eq!(format_expiry("12"), "12/");
        assert_eq!(format_expiry("1228"), "12/28");
        assert_eq!(format_expiry("12/289"), "12/28");
    }

    #[test]
    fn cpf_and_cnpj() {
        assert_eq!(format_cpf_cnpj("12345678909"), "123.456.789-09");
        assert_eq!(format_cpf_cnpj("11222333000181"), "11.222.333/0001-81");
        assert_eq!(format_cpf_cnpj("123.456"), "123456");
    }

    #[test]
    fn cep_dash_after_five() {
        assert_eq!(format_cep("79002"), "79002");
        assert_eq!(format_cep("79002170"), "79002-170");
        assert_eq!(format_cep("79.002-1709"), "79002-170");
    }

    #[test]
    fn digits_only_strips_everything_else() {
        assert_eq!(digits_only(" 1a2-3 "), "123");
    }
}
