//! Centralized limits for pipeline payload handling
//!
//! All size caps and fallback contacts in one place for easy tuning.

/// Maximum accepted length for a sanitized client brief, in characters
pub const MAX_BRIEF_CHARS: usize = 5000;

/// Minimum trimmed length for a client brief to be considered usable
pub const MIN_BRIEF_CHARS: usize = 10;

/// Preview cap for raw architect-stage responses embedded in diagnostics
pub const ARCHITECT_PREVIEW_CHARS: usize = 200;

/// Preview cap for raw validator responses embedded in the QA report
pub const REVIEW_PREVIEW_CHARS: usize = 500;

/// Recipient used when no valid client address can be resolved.
/// Error reports must never carry an unvalidated address outward.
pub const SUPPORT_EMAIL: &str = "support@brieflow.dev";

/// Sentinel recipient recorded for unclassifiable payloads. Deliberately
/// fails address validation so outbound reports reroute to support.
pub const UNKNOWN_EMAIL: &str = "unknown@unknown";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brief_bounds_are_ordered() {
        assert!(MIN_BRIEF_CHARS < MAX_BRIEF_CHARS);
    }

    #[test]
    fn preview_caps_fit_inside_brief_cap() {
        assert!(ARCHITECT_PREVIEW_CHARS < MAX_BRIEF_CHARS);
        assert!(REVIEW_PREVIEW_CHARS < MAX_BRIEF_CHARS);
    }

    #[test]
    fn fallback_addresses_look_like_addresses() {
        assert!(SUPPORT_EMAIL.contains('@'));
        assert!(UNKNOWN_EMAIL.contains('@'));
    }
}
