//! External LLM call contract
//!
//! Upstream calls return `{ candidates: [{ content: { parts: [{ text }] } }] }`
//! on success or `{ error: {...} }` on failure. That exact shape is owned by
//! the out-of-scope orchestrator layer; this module tolerates it without
//! change and null-guards every hop, since any level may be absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmCallResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidatePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LlmCallResult {
    /// The response text of the first candidate, if every hop is present
    pub fn response_text(&self) -> Option<&str> {
        self.candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .first()?
            .text
            .as_deref()
    }

    /// The upstream error object, if the call itself failed
    pub fn upstream_error(&self) -> Option<&Value> {
        self.error.as_ref()
    }

    /// Build a well-formed successful result wrapping `text`
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: Some(vec![CandidatePart {
                        text: Some(text.into()),
                    }]),
                }),
            }]),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_the_external_shape() {
        let raw = json!({
            "candidates": [{"content": {"parts": [{"text": "hello"}]}}]
        });
        let result: LlmCallResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.response_text(), Some("hello"));
        assert!(result.upstream_error().is_none());
    }

    #[test]
    fn tolerates_missing_levels() {
        for raw in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{}]}),
            json!({"candidates": [{"content": {}}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{}]}}]}),
        ] {
            let result: LlmCallResult = serde_json::from_value(raw).unwrap();
            assert_eq!(result.response_text(), None);
        }
    }

    #[test]
    fn surfaces_upstream_error_object() {
        let raw = json!({"error": {"code": 429, "message": "quota"}});
        let result: LlmCallResult = serde_json::from_value(raw).unwrap();
        assert!(result.upstream_error().is_some());
        assert_eq!(result.response_text(), None);
    }

    #[test]
    fn from_text_builds_a_readable_result() {
        let result = LlmCallResult::from_text("{\"a\":1}");
        assert_eq!(result.response_text(), Some("{\"a\":1}"));
    }
}
