//! Error Reporter - stage 6
//!
//! Terminal stage: turns whatever went wrong upstream into one well-formed,
//! fully escaped notification. This is the component that must not itself
//! exit abnormally, so the rendering body runs under an unwind guard and
//! collapses to a fixed, pre-escaped template on any internal failure.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

use crate::envelope::{ErrorDetail, ErrorEnvelope, NormalizedRequest, Source};
use crate::intake::sanitize::is_valid_email;
use crate::render;
use crate::util::constants::SUPPORT_EMAIL;

const FAILURE_SUBJECT: &str = "We could not generate your workflow";
const DEFAULT_MESSAGE: &str = "An unexpected error interrupted workflow generation";

/// The final, sendable failure notification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub error: bool,
    /// Validated recipient; substituted with support when unresolvable
    pub client_email: String,
    pub subject: String,
    /// Pre-escaped HTML body; safe to embed directly
    pub email_html: String,
    pub source: Source,
    pub timestamp: DateTime<Utc>,
    pub error_details: Vec<ErrorDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_error: Option<ErrorEnvelope>,
    pub critical_error: bool,
}

pub fn report(
    envelope: Option<&ErrorEnvelope>,
    normalized: Option<&NormalizedRequest>,
) -> FailureReport {
    match catch_unwind(AssertUnwindSafe(|| render_report(envelope, normalized))) {
        Ok(report) => report,
        Err(_) => {
            error!("error reporter failed internally; sending minimal fallback notification");
            FailureReport {
                error: true,
                client_email: SUPPORT_EMAIL.to_string(),
                subject: FAILURE_SUBJECT.to_string(),
                email_html: render::FALLBACK_ERROR_HTML.to_string(),
                source: Source::Unknown,
                timestamp: Utc::now(),
                error_details: Vec::new(),
                original_error: None,
                critical_error: true,
            }
        }
    }
}

fn render_report(
    envelope: Option<&ErrorEnvelope>,
    normalized: Option<&NormalizedRequest>,
) -> FailureReport {
    let stage = envelope
        .map(|env| env.stage.as_str())
        .filter(|stage| !stage.is_empty())
        .unwrap_or("unknown");

    let message = envelope
        .map(|env| env.message.clone())
        .filter(|message| !message.is_empty())
        .or_else(|| normalized.and_then(|req| req.error_message.clone()))
        .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

    let source = envelope
        .map(|env| env.source)
        .or_else(|| normalized.map(|req| req.source))
        .unwrap_or(Source::Unknown);

    // Resolve a recipient, then validate it; an address that fails the same
    // check intake uses is never forwarded into an outbound field
    let resolved_email = envelope
        .map(|env| env.client_email.clone())
        .filter(|email| is_valid_email(email))
        .or_else(|| {
            normalized
                .and_then(|req| req.client_email.clone())
                .filter(|email| is_valid_email(email))
        });
    let client_email = resolved_email.unwrap_or_else(|| SUPPORT_EMAIL.to_string());

    let error_details: Vec<ErrorDetail> = normalized
        .map(|req| req.errors.clone())
        .unwrap_or_default();

    let email_html = render::error_report(stage, &message, source, &error_details);

    FailureReport {
        error: true,
        client_email,
        subject: FAILURE_SUBJECT.to_string(),
        email_html,
        source,
        timestamp: Utc::now(),
        error_details,
        original_error: envelope.cloned(),
        critical_error: false,
    }
}
