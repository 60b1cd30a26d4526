//! Product brands
//!
//! The product form picks brands from a server-rendered `<select>`; the
//! options carry the brand id as their value.

use crate::error::AdminError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Server message when a brand name is taken
pub const DUPLICATE_BRAND: &str = "marca ja cadastrada";

static OPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<option[^>]*\bvalue="(\d+)"[^>]*>(.*?)</option>"#).expect("valid pattern")
});

/// A brand products can be tagged with
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
}

/// Trimmed brand name, or `AdminError::Invalid` if blank
///
/// # Errors
/// - `AdminError::Invalid` when `name` is empty after trimming
pub fn brand_name(name: &str) -> Result<&str, AdminError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AdminError::Invalid("brand name is empty".to_string()));
    }
    Ok(trimmed)
}

/// Brands listed in brand `<option>` markup, in markup order
///
/// Options without a numeric value (placeholders) are skipped.
#[must_use]
pub fn parse_brand_options(markup: &str) -> Vec<Brand> {
    OPTION
        .captures_iter(markup)
        .filter_map(|caps| {
            let id = caps[1].parse().ok()?;
            let name = caps[2].trim();
            (!name.is_empty()).then(|| Brand {
                id,
                name: name.to_string(),
            })
        })
        .collect()
}
