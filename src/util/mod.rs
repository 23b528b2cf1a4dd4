//! Shared helpers: fenced-JSON extraction, truncation, limits

pub mod constants;
pub mod fenced;

pub use fenced::extract_json_block;

/// Truncate a string to at most `max` characters, respecting char boundaries.
///
/// Used for diagnostics previews so a malformed LLM response never drags an
/// arbitrarily large payload into logs or rendered reports.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
