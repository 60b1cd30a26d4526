//! Human-readable order references
//!
//! `ORD-<millis since epoch, base36>-<3 random base36 chars>`, upper case.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An order reference shown on the confirmation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    /// Wrap a reference issued elsewhere (e.g. by the server)
    #[inline]
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Generate from `now` and `rng`
    #[must_use]
    pub fn generate<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let suffix: String = (0..3)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        Self(format!("ORD-{}-{suffix}", to_base36(millis)))
    }

    /// Generate from the current time and thread RNG
    #[must_use]
    pub fn generate_now() -> Self {
        Self::generate(Utc::now(), &mut rand::rng())
    }

    /// The reference text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        // n % 36 < 36, so the index is always in bounds
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_700_000_000_000), "LOYW3V28");
    }

    #[test]
    fn reference_shape() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let reference = OrderReference::generate(now, &mut StdRng::seed_from_u64(7));
        let parts: Vec<&str> = reference.as_str().split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], "LOYW3V28");
        assert_eq!(parts[2].len(), 3);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn display_and_server_issued() {
        let reference = OrderReference::new("ORD-42");
        assert_eq!(reference.to_string(), "ORD-42");
        assert!(OrderReference::generate_now().as_str().starts_with("ORD-"));
    }
}
