//! Validation Reporter - stage 5
//!
//! Interprets the validator's verdict over the generated workflow. This
//! stage is user-facing: whatever the validator did (errored, said nothing,
//! emitted garbage), the result is a renderable payload, never a bare
//! failure.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::artifact::GeneratedArtifact;
use crate::envelope::Source;
use crate::llm::LlmCallResult;
use crate::render;
use crate::rules::{evaluate_rules, KnowledgeBase};
use crate::util::constants::REVIEW_PREVIEW_CHARS;
use crate::util::{extract_json_block, truncate_chars};

/// Placeholder when the validator offers no summary of its own
const DEFAULT_SUMMARY: &str = "No summary provided by the validator.";

/// Merged output of the validation stage
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    pub qa_validation_complete: bool,
    pub qa_validation_failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qa_parse_error: Option<String>,
    /// Pre-escaped HTML report; safe to embed directly
    pub qa_html: String,
    pub valid: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
    pub summary: String,
    /// True when the validator's corrected artifact replaced the original
    pub corrected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_workflow_json: Option<GeneratedArtifact>,
    pub client_email: Option<String>,
    pub source: Source,
}

pub fn report(llm: Option<&LlmCallResult>, kb: Option<&KnowledgeBase>) -> ReviewResult {
    let Some(kb) = kb else {
        warn!("validation stage invoked without its knowledge base");
        return failed_result(
            None,
            render::qa_failure("Validation context was unavailable."),
            None,
        );
    };

    if llm.and_then(LlmCallResult::upstream_error).is_some() {
        warn!("validator call reported an upstream error");
        let detail = summarize_upstream(llm);
        return failed_result(Some(kb), render::qa_failure(&detail), None);
    }

    let Some(text) = llm.and_then(LlmCallResult::response_text) else {
        return failed_result(
            Some(kb),
            render::qa_failure("The validator returned no response."),
            None,
        );
    };

    let block = extract_json_block(text);
    let verdict = match serde_json::from_str::<Value>(block) {
        Ok(value) => value,
        Err(parse_error) => {
            let preview = truncate_chars(text, REVIEW_PREVIEW_CHARS);
            return failed_result(
                Some(kb),
                render::qa_failure(&format!("Raw validator output: {preview}")),
                Some(parse_error.to_string()),
            );
        }
    };

    // Defensive coercion: the validator is an LLM, so nothing about the
    // verdict's shape is taken on faith
    let valid = verdict.get("valid") == Some(&Value::Bool(true));
    let confidence = verdict
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.95);
    let issues: Vec<String> = verdict
        .get("issues")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(stringify_issue).collect())
        .unwrap_or_default();
    let summary = verdict
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SUMMARY)
        .to_string();

    // Prefer the validator's corrected artifact when it is structurally
    // sound; otherwise keep the original
    let (final_artifact, corrected) = match verdict
        .get("correctedArtifact")
        .map(GeneratedArtifact::from_value)
    {
        Some(Ok(artifact)) => (artifact, true),
        _ => (kb.synthesis.workflow_json.clone(), false),
    };

    let rule_failures: Vec<(&'static str, &'static str)> = evaluate_rules(&final_artifact)
        .into_iter()
        .filter(|outcome| !outcome.passed)
        .map(|outcome| (outcome.rule.as_str(), outcome.rule.description()))
        .collect();

    debug!(
        valid,
        confidence,
        issues = issues.len(),
        rule_failures = rule_failures.len(),
        corrected,
        "validation verdict interpreted"
    );

    let qa_html = render::qa_report(
        valid,
        confidence,
        &issues,
        &summary,
        kb.synthesis.source,
        &rule_failures,
    );

    ReviewResult {
        qa_validation_complete: true,
        qa_validation_failed: false,
        qa_parse_error: None,
        qa_html,
        valid,
        confidence,
        issues,
        summary,
        corrected,
        final_workflow_json: Some(final_artifact),
        client_email: kb.synthesis.client_email.clone(),
        source: kb.synthesis.source,
    }
}

/// Degraded result: validation did not happen, but the payload still
/// renders and still carries the unreviewed workflow when one exists
fn failed_result(
    kb: Option<&KnowledgeBase>,
    qa_html: String,
    qa_parse_error: Option<String>,
) -> ReviewResult {
    ReviewResult {
        qa_validation_complete: false,
        qa_validation_failed: true,
        qa_parse_error,
        qa_html,
        valid: false,
        confidence: 0.0,
        issues: Vec::new(),
        summary: DEFAULT_SUMMARY.to_string(),
        corrected: false,
        final_workflow_json: kb.map(|kb| kb.synthesis.workflow_json.clone()),
        client_email: kb.and_then(|kb| kb.synthesis.client_email.clone()),
        source: kb.map(|kb| kb.synthesis.source).unwrap_or(Source::Unknown),
    }
}

fn summarize_upstream(llm: Option<&LlmCallResult>) -> String {
    let detail = llm
        .and_then(LlmCallResult::upstream_error)
        .map(Value::to_string)
        .unwrap_or_default();
    format!(
        "The validator call failed: {}",
        truncate_chars(&detail, REVIEW_PREVIEW_CHARS)
    )
}

fn stringify_issue(issue: &Value) -> String {
    match issue {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
