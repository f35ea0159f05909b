//! Lookup-key normalization
//!
//! District and soil texture keys are trimmed and lower-cased. Month names
//! are additionally capitalized ("  AUGUST " → "August") to match the
//! reference table's month format.

/// Trim surrounding whitespace and lower-case
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trim, then upper-case the first character and lower-case the rest
pub fn normalize_month(raw: &str) -> String {
    capitalize(raw.trim())
}

/// First character upper case, remainder lower case
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
