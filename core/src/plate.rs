//! Brazilian license plate rules.
//!
//! Accepts the legacy `AAA-1234` layout (separator optional) and the Mercosul
//! `AAA1A23` layout. Input is normalized before matching.

use std::sync::LazyLock;

use regex::Regex;

static PLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Z]{3}-?[0-9]{4}|[A-Z]{3}[0-9][A-Z][0-9]{2})$").expect("plate pattern is valid")
});

/// Trim, uppercase and drop inner spaces.
pub fn normalize_plate(value: &str) -> String {
    value.trim().to_uppercase().replace(' ', "")
}

/// True when the normalized `value` is a valid plate.
pub fn is_valid_plate(value: &str) -> bool {
    PLATE_RE.is_match(&normalize_plate(value))
}
