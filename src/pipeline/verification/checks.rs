//! Field-level checks shared by the verifiers.
//!
//! Name and date comparisons are exact. A single OCR slip in a name is a
//! mismatch.

use std::sync::LazyLock;

use regex::Regex;

static PAN_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("Invalid PAN regex"));

static AADHAAR_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{12}$").expect("Invalid Aadhaar regex"));

pub fn pan_format_valid(pan: &str) -> bool {
    PAN_FORMAT.is_match(pan)
}

pub fn aadhaar_format_valid(aadhaar: &str) -> bool {
    AADHAAR_FORMAT.is_match(aadhaar)
}

/// Case-insensitive equality. A user without a stored name never matches.
pub fn names_match(extracted: &str, stored: Option<&str>) -> bool {
    stored.is_some_and(|s| extracted.to_lowercase() == s.to_lowercase())
}

/// Exact string equality. No date parsing: `12/08/1975` and `1975-08-12` differ.
pub fn dobs_match(extracted: &str, stored: Option<&str>) -> bool {
    stored.is_some_and(|s| extracted == s)
}

/// Mean of the credits, rounded to the nearest whole rupee.
pub fn average_rounded(credits: &[f64]) -> i64 {
    if credits.is_empty() {
        return 0;
    }
    (credits.iter().sum::<f64>() / credits.len() as f64).round() as i64
}

pub fn last_four(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    chars[chars.len().saturating_sub(4)..].iter().collect()
}

/// Identifier form safe for logs.
pub fn mask_id(id: &str) -> String {
    format!("****{}", last_four(id))
}
