//! Context Preparer - stage 2
//!
//! Parses the workflow architect's response into a structured spec and
//! forwards the intake fields unchanged, with the static lessons-learned
//! digest attached.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::envelope::{ErrorEnvelope, NormalizedRequest, StageResult, StageSpec};
use crate::llm::LlmCallResult;
use crate::rules::knowledge::LESSONS_LEARNED;
use crate::util::constants::ARCHITECT_PREVIEW_CHARS;
use crate::util::{extract_json_block, truncate_chars};

pub fn prepare(
    llm: Option<&LlmCallResult>,
    normalized: Option<&NormalizedRequest>,
) -> StageResult<StageSpec> {
    let Some(request) = normalized else {
        return Err(ErrorEnvelope::new(
            "prepare-context",
            "Normalized request data is missing",
        ));
    };

    if let Some(upstream) = llm.and_then(LlmCallResult::upstream_error) {
        warn!("architect call reported an upstream error");
        return Err(ErrorEnvelope::for_request(
            "architect",
            "Workflow architect call failed",
            normalized,
        )
        .with_detail("upstreamError", upstream.clone()));
    }

    let Some(text) = llm.and_then(LlmCallResult::response_text) else {
        return Err(ErrorEnvelope::for_request(
            "architect-response",
            "Workflow architect returned no response text",
            normalized,
        ));
    };

    let block = extract_json_block(text);
    let spec = match serde_json::from_str::<Value>(block) {
        Ok(value) if value.is_object() => value,
        Ok(_) => {
            return Err(parse_envelope(
                "Architect response is not a JSON object",
                text,
                normalized,
            ));
        }
        Err(parse_error) => {
            return Err(parse_envelope(
                &format!("Architect response is not valid JSON: {parse_error}"),
                text,
                normalized,
            ));
        }
    };

    debug!("architect spec parsed");
    Ok(StageSpec {
        architect_spec: spec,
        lessons_learned: LESSONS_LEARNED.clone(),
        client_brief: request.client_brief.clone(),
        client_email: request.client_email.clone(),
        source: request.source,
        timestamp: Utc::now(),
        metadata: request.metadata.clone(),
    })
}

/// Parse failures carry a bounded preview of the raw text, never all of it
fn parse_envelope(
    message: &str,
    raw_text: &str,
    normalized: Option<&NormalizedRequest>,
) -> ErrorEnvelope {
    ErrorEnvelope::for_request("architect-parse", message, normalized).with_detail(
        "rawPreview",
        json!(truncate_chars(raw_text, ARCHITECT_PREVIEW_CHARS)),
    )
}
