//! Driver-facing error types with error codes
//!
//! Error code ranges:
//! - BRF-001-009: Payload file errors
//! - BRF-010-019: Artifact errors
//! - BRF-020-029: Output errors
//!
//! Pipeline stages never use these: their failures travel as
//! [`crate::envelope::ErrorEnvelope`] data so a report can always be
//! rendered. This taxonomy covers the CLI adapter around the pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrieflowError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum BrieflowError {
    #[error("[BRF-001] Failed to read payload file '{path}': {details}")]
    PayloadRead { path: String, details: String },

    #[error("[BRF-002] Payload file '{path}' is not valid JSON: {details}")]
    PayloadParse { path: String, details: String },

    #[error("[BRF-010] Artifact file '{path}' is not a workflow: {details}")]
    ArtifactInvalid { path: String, details: String },

    #[error("[BRF-020] Failed to serialize pipeline output: {details}")]
    OutputSerialize { details: String },
}

impl FixSuggestion for BrieflowError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BrieflowError::PayloadRead { .. } => Some("Check the file path exists and is readable"),
            BrieflowError::PayloadParse { .. } => {
                Some("The file must contain a single JSON value; check for trailing commas")
            }
            BrieflowError::ArtifactInvalid { .. } => {
                Some("A workflow needs a non-empty 'nodes' array and a 'connections' object")
            }
            BrieflowError::OutputSerialize { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_their_codes() {
        let error = BrieflowError::PayloadParse {
            path: "raw.json".into(),
            details: "expected value at line 1".into(),
        };
        let message = error.to_string();
        assert!(message.contains("BRF-002"));
        assert!(message.contains("raw.json"));
    }

    #[test]
    fn suggestions_exist_for_user_fixable_errors() {
        let error = BrieflowError::PayloadRead {
            path: "x".into(),
            details: "no such file".into(),
        };
        assert!(error.fix_suggestion().is_some());

        let error = BrieflowError::OutputSerialize { details: "x".into() };
        assert!(error.fix_suggestion().is_none());
    }
}
