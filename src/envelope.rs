//! Stage plumbing types
//!
//! Everything that crosses a stage boundary is plain data. A stage that
//! fails returns an [`ErrorEnvelope`] instead of raising; the orchestrator
//! pattern-matches on [`StageResult`] and diverts envelopes to the error
//! reporter. Details accumulated during intake ride along as
//! [`ErrorDetail`] records and are never mutated after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::artifact::GeneratedArtifact;
use crate::util::constants::UNKNOWN_EMAIL;

/// Result type for stages 2-5: success payload or a structured envelope
pub type StageResult<T> = Result<T, ErrorEnvelope>;

/// Severity of a structured error detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

/// Stable machine codes attached to intake error details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetailCode {
    InvalidInput,
    UnknownInputSource,
    InvalidEmailAddress,
    InvalidEmailFormat,
    InvalidBriefLength,
    MissingClientBrief,
    UnexpectedError,
}

impl DetailCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailCode::InvalidInput => "INVALID_INPUT",
            DetailCode::UnknownInputSource => "UNKNOWN_INPUT_SOURCE",
            DetailCode::InvalidEmailAddress => "INVALID_EMAIL_ADDRESS",
            DetailCode::InvalidEmailFormat => "INVALID_EMAIL_FORMAT",
            DetailCode::InvalidBriefLength => "INVALID_BRIEF_LENGTH",
            DetailCode::MissingClientBrief => "MISSING_CLIENT_BRIEF",
            DetailCode::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }
}

/// A single structured error with context, immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: DetailCode,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(flatten)]
    pub context: Map<String, Value>,
}

impl ErrorDetail {
    pub fn new(code: DetailCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            severity,
            field: None,
            context: Map::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }
}

/// Where the inbound request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Email,
    Form,
    Unknown,
    Error,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Email => "email",
            Source::Form => "form",
            Source::Unknown => "unknown",
            Source::Error => "error",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical internal representation produced by intake (stage 1)
///
/// Invariant: `error == true` iff `errors` is non-empty, and an erroring
/// request always carries a non-empty `error_message` joined from its
/// critical entries. On `error == false`, `client_brief` and `client_email`
/// are present, non-empty, and validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRequest {
    pub client_brief: Option<String>,
    pub client_email: Option<String>,
    pub source: Source,
    pub error: bool,
    pub errors: Vec<ErrorDetail>,
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub metadata: Map<String, Value>,
}

/// The universal failure payload flowing between stages
///
/// Every stage that fails produces exactly one envelope and returns it;
/// nothing is thrown across a stage boundary under expected failure modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: bool,
    pub stage: String,
    pub message: String,
    pub client_email: String,
    pub source: Source,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl ErrorEnvelope {
    /// Envelope with no request context (dependency missing entirely)
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: true,
            stage: stage.into(),
            message: message.into(),
            client_email: UNKNOWN_EMAIL.to_string(),
            source: Source::Unknown,
            timestamp: Utc::now(),
            additional: Map::new(),
        }
    }

    /// Envelope carrying provenance from the normalized request, when present
    pub fn for_request(
        stage: impl Into<String>,
        message: impl Into<String>,
        normalized: Option<&NormalizedRequest>,
    ) -> Self {
        let mut envelope = Self::new(stage, message);
        if let Some(req) = normalized {
            if let Some(email) = &req.client_email {
                envelope.client_email = email.clone();
            }
            envelope.source = req.source;
        }
        envelope
    }

    /// Envelope carrying provenance from a prepared stage spec, when present
    pub fn for_spec(
        stage: impl Into<String>,
        message: impl Into<String>,
        spec: Option<&StageSpec>,
    ) -> Self {
        let mut envelope = Self::new(stage, message);
        if let Some(spec) = spec {
            if let Some(email) = &spec.client_email {
                envelope.client_email = email.clone();
            }
            envelope.source = spec.source;
        }
        envelope
    }

    /// Attach a diagnostic extra (truncated previews, upstream errors)
    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.additional.insert(key.into(), value);
        self
    }
}

/// Output of the context-preparer stage: the architect's structured spec
/// plus the intake fields it forwards unchanged
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSpec {
    pub architect_spec: Value,
    pub lessons_learned: Value,
    pub client_brief: Option<String>,
    pub client_email: Option<String>,
    pub source: Source,
    pub timestamp: DateTime<Utc>,
    pub metadata: Map<String, Value>,
}

/// Output of the artifact-formatter stage: the parsed workflow graph plus
/// the safe, rendered summary and carry-over provenance
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    pub success: bool,
    pub client_email: Option<String>,
    pub client_brief: Option<String>,
    pub source: Source,
    pub workflow_json: GeneratedArtifact,
    /// Pre-escaped HTML; safe to embed directly in a message body
    pub workflow_summary: String,
    pub qa_validation_pending: bool,
    pub metadata: SynthesisMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisMetadata {
    pub node_count: usize,
    pub connection_count: usize,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_codes_serialize_screaming_snake() {
        let detail = ErrorDetail::new(
            DetailCode::InvalidEmailAddress,
            Severity::Critical,
            "bad address",
        );
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["code"], "INVALID_EMAIL_ADDRESS");
        assert_eq!(value["severity"], "critical");
    }

    #[test]
    fn detail_context_flattens_into_record() {
        let detail = ErrorDetail::new(DetailCode::InvalidBriefLength, Severity::Critical, "short")
            .with_field("clientBrief")
            .with_context("actualLength", json!(3));
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["field"], "clientBrief");
        assert_eq!(value["actualLength"], 3);
    }

    #[test]
    fn envelope_defaults_to_unknown_provenance() {
        let envelope = ErrorEnvelope::new("architect", "no response");
        assert!(envelope.error);
        assert_eq!(envelope.source, Source::Unknown);
        assert_eq!(envelope.client_email, UNKNOWN_EMAIL);
    }

    #[test]
    fn envelope_picks_up_request_provenance() {
        let normalized = NormalizedRequest {
            client_brief: Some("sync orders".into()),
            client_email: Some("client@example.com".into()),
            source: Source::Form,
            error: false,
            errors: vec![],
            error_message: None,
            timestamp: Utc::now(),
            metadata: Map::new(),
        };
        let envelope = ErrorEnvelope::for_request("synthesis", "parse failed", Some(&normalized));
        assert_eq!(envelope.client_email, "client@example.com");
        assert_eq!(envelope.source, Source::Form);
    }

    #[test]
    fn normalized_request_uses_camel_case_wire_keys() {
        let normalized = NormalizedRequest {
            client_brief: None,
            client_email: None,
            source: Source::Error,
            error: true,
            errors: vec![],
            error_message: Some("boom".into()),
            timestamp: Utc::now(),
            metadata: Map::new(),
        };
        let value = serde_json::to_value(&normalized).unwrap();
        assert!(value.get("clientBrief").is_some());
        assert!(value.get("errorMessage").is_some());
        assert_eq!(value["source"], "error");
    }
}
