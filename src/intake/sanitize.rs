//! Text and email sanitizers
//!
//! Both sanitizers are idempotent: applying one twice is the same as
//! applying it once. Accepted text is whitespace-collapsed, trimmed, and
//! capped; addresses are trimmed and lowercased before validation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::constants::MAX_BRIEF_CHARS;
use crate::util::truncate_chars;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// RFC-lite address check: something@something.something, no whitespace
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Collapse whitespace runs to single spaces, trim, and cap the length
pub fn sanitize_text(input: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(input, " ");
    truncate_chars(collapsed.trim(), MAX_BRIEF_CHARS).to_string()
}

/// Trim and lowercase an address candidate
pub fn sanitize_email(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Validate the trimmed candidate against the RFC-lite pattern
pub fn is_valid_email(input: &str) -> bool {
    EMAIL_PATTERN.is_match(input.trim())
}
