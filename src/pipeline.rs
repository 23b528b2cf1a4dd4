//! Pipeline driver
//!
//! The explicit-dependency adapter around the six stages: each stage gets
//! its upstream payload as a parameter, any failure envelope diverts to the
//! error reporter, and the caller receives either a deliverable success
//! notification or a deliverable failure notification. Never silence.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, info_span};

use crate::artifact::GeneratedArtifact;
use crate::envelope::ErrorEnvelope;
use crate::intake;
use crate::llm::LlmCallResult;
use crate::rules;
use crate::stage::{architect, failure, review, synthesis};
use crate::stage::failure::FailureReport;
use crate::util::constants::SUPPORT_EMAIL;

/// Everything the notification sender needs on success
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredNotification {
    pub client_email: String,
    pub subject: String,
    /// Pre-escaped HTML
    pub workflow_summary: String,
    /// Pre-escaped HTML
    pub qa_html: String,
    pub final_workflow_json: GeneratedArtifact,
}

/// Terminal pipeline outcome; both variants are sendable notifications
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PipelineOutcome {
    Delivered(DeliveredNotification),
    Failed(FailureReport),
}

impl PipelineOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, PipelineOutcome::Delivered(_))
    }
}

/// Run the full pipeline over one inbound request and its three LLM call
/// results. Synchronous, no I/O, no shared state between invocations.
pub fn run(
    raw: Option<&Value>,
    architect_llm: Option<&LlmCallResult>,
    synthesis_llm: Option<&LlmCallResult>,
    review_llm: Option<&LlmCallResult>,
) -> PipelineOutcome {
    let span = info_span!("pipeline");
    let _guard = span.enter();

    let normalized = intake::normalize(raw);
    if normalized.error {
        let message = normalized
            .error_message
            .clone()
            .unwrap_or_else(|| "Input validation failed".to_string());
        let envelope = ErrorEnvelope::for_request("input-validation", message, Some(&normalized));
        info!(stage = "input-validation", "diverting to error reporter");
        return PipelineOutcome::Failed(failure::report(Some(&envelope), Some(&normalized)));
    }

    let spec = match architect::prepare(architect_llm, Some(&normalized)) {
        Ok(spec) => spec,
        Err(envelope) => {
            info!(stage = %envelope.stage, "diverting to error reporter");
            return PipelineOutcome::Failed(failure::report(Some(&envelope), Some(&normalized)));
        }
    };

    let synthesized = match synthesis::format(synthesis_llm, Some(&spec)) {
        Ok(result) => result,
        Err(envelope) => {
            info!(stage = %envelope.stage, "diverting to error reporter");
            return PipelineOutcome::Failed(failure::report(Some(&envelope), Some(&normalized)));
        }
    };

    let kb = rules::load_knowledge_base(synthesized);
    let reviewed = review::report(review_llm, Some(&kb));

    let workflow_name = reviewed
        .final_workflow_json
        .as_ref()
        .map(|artifact| artifact.name.clone())
        .unwrap_or_default();
    let final_workflow_json = reviewed
        .final_workflow_json
        .unwrap_or_else(|| kb.synthesis.workflow_json.clone());

    let subject = if workflow_name.is_empty() {
        "Your workflow is ready".to_string()
    } else {
        format!("Your workflow is ready: {workflow_name}")
    };

    info!(
        validated = reviewed.qa_validation_complete,
        "pipeline completed"
    );

    PipelineOutcome::Delivered(DeliveredNotification {
        client_email: kb
            .synthesis
            .client_email
            .clone()
            .unwrap_or_else(|| SUPPORT_EMAIL.to_string()),
        subject,
        workflow_summary: kb.synthesis.workflow_summary.clone(),
        qa_html: reviewed.qa_html,
        final_workflow_json,
    })
}
