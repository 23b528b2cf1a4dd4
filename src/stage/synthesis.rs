//! Artifact Formatter - stage 3
//!
//! Parses the workflow builder's response into the generated artifact,
//! gates it structurally, and renders the escaped human-readable summary.

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::artifact::GeneratedArtifact;
use crate::envelope::{
    ErrorEnvelope, StageResult, StageSpec, SynthesisMetadata, SynthesisResult,
};
use crate::llm::LlmCallResult;
use crate::render;
use crate::util::constants::ARCHITECT_PREVIEW_CHARS;
use crate::util::{extract_json_block, truncate_chars};

pub fn format(
    llm: Option<&LlmCallResult>,
    context: Option<&StageSpec>,
) -> StageResult<SynthesisResult> {
    let Some(spec) = context else {
        return Err(ErrorEnvelope::new(
            "synthesis",
            "Prepared workflow context is missing",
        ));
    };

    if let Some(upstream) = llm.and_then(LlmCallResult::upstream_error) {
        warn!("synthesis call reported an upstream error");
        return Err(
            ErrorEnvelope::for_spec("synthesis", "Workflow builder call failed", context)
                .with_detail("upstreamError", upstream.clone()),
        );
    }

    let Some(text) = llm.and_then(LlmCallResult::response_text) else {
        return Err(ErrorEnvelope::for_spec(
            "synthesis-parse",
            "Workflow builder returned no response text",
            context,
        ));
    };

    let block = extract_json_block(text);
    let parsed = match serde_json::from_str::<Value>(block) {
        Ok(value) => value,
        Err(parse_error) => {
            return Err(parse_envelope(
                &format!("Workflow response is not valid JSON: {parse_error}"),
                text,
                context,
            ));
        }
    };

    let artifact = match GeneratedArtifact::from_value(&parsed) {
        Ok(artifact) => artifact,
        Err(defect) => return Err(parse_envelope(defect, text, context)),
    };

    debug!(
        nodes = artifact.node_count(),
        connections = artifact.connection_count(),
        "workflow artifact parsed"
    );

    let workflow_summary = render::workflow_summary(
        &artifact.name,
        spec.source,
        artifact.node_count(),
        artifact.connection_count(),
    );

    Ok(SynthesisResult {
        success: true,
        client_email: spec.client_email.clone(),
        client_brief: spec.client_brief.clone(),
        source: spec.source,
        metadata: SynthesisMetadata {
            node_count: artifact.node_count(),
            connection_count: artifact.connection_count(),
            size: artifact.serialized_size(),
        },
        workflow_json: artifact,
        workflow_summary,
        qa_validation_pending: true,
    })
}

fn parse_envelope(message: &str, raw_text: &str, context: Option<&StageSpec>) -> ErrorEnvelope {
    ErrorEnvelope::for_spec("synthesis-parse", message, context).with_detail(
        "rawPreview",
        json!(truncate_chars(raw_text, ARCHITECT_PREVIEW_CHARS)),
    )
}
