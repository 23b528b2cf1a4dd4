//! Input Normalizer - stage 1
//!
//! Classifies an untrusted inbound payload (Gmail-shaped email, web-form
//! submission, or something unrecognizable), extracts and validates the
//! client brief and reply address, and produces the canonical
//! [`NormalizedRequest`] every later stage depends on.
//!
//! This stage never panics outward: the whole body runs under an unwind
//! guard and any internal failure degrades to an `UNEXPECTED_ERROR` result.

pub mod brief;
pub mod sanitize;

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::envelope::{DetailCode, ErrorDetail, NormalizedRequest, Severity, Source};
use crate::util::constants::{MIN_BRIEF_CHARS, UNKNOWN_EMAIL};

use brief::extract_brief;
use sanitize::{is_valid_email, sanitize_email, sanitize_text};

/// Form field labels as submitted by the intake form
const FORM_BRIEF_FIELD: &str = "Client Brief";
const FORM_EMAIL_FIELD: &str = "Your Email";

/// Field names tried, in order, for best-effort extraction from an
/// unrecognized payload shape
const BRIEF_CANDIDATES: &[&str] = &[
    FORM_BRIEF_FIELD,
    "client_brief",
    "brief",
    "text",
    "message",
    "body",
];
const EMAIL_CANDIDATES: &[&str] = &[FORM_EMAIL_FIELD, "your_email", "email", "from", "sender"];

/// Normalize a raw inbound payload. Total: classification surprises and
/// internal bugs alike come back as `error == true` results, never panics.
pub fn normalize(raw: Option<&Value>) -> NormalizedRequest {
    match catch_unwind(AssertUnwindSafe(|| normalize_inner(raw))) {
        Ok(normalized) => normalized,
        Err(_) => {
            warn!("input normalizer panicked; degrading to UNEXPECTED_ERROR result");
            finalize(
                Source::Error,
                None,
                None,
                vec![ErrorDetail::new(
                    DetailCode::UnexpectedError,
                    Severity::Critical,
                    "Unexpected internal error while normalizing input",
                )],
                Map::new(),
            )
        }
    }
}

fn normalize_inner(raw: Option<&Value>) -> NormalizedRequest {
    let Some(payload) = raw.and_then(Value::as_object) else {
        return finalize(
            Source::Error,
            None,
            None,
            vec![ErrorDetail::new(
                DetailCode::InvalidInput,
                Severity::Critical,
                "Input payload is missing or not an object",
            )],
            Map::new(),
        );
    };

    // Email classification wins over form when a payload somehow carries both
    let is_email = ["id", "threadId", "labelIds"]
        .iter()
        .all(|key| payload.contains_key(*key));
    let is_form =
        payload.contains_key(FORM_BRIEF_FIELD) || payload.contains_key(FORM_EMAIL_FIELD);

    if is_email {
        debug!("classified inbound payload as email");
        normalize_email(payload)
    } else if is_form {
        debug!("classified inbound payload as form submission");
        normalize_form(payload)
    } else {
        debug!("inbound payload shape not recognized");
        normalize_unknown(payload)
    }
}

fn normalize_email(payload: &Map<String, Value>) -> NormalizedRequest {
    let mut errors = Vec::new();
    let mut metadata = Map::new();

    // Sender lives at from.value[0].address on parsed messages, or as a
    // plain string on simplified ones
    let sender = payload
        .get("from")
        .map(|from| {
            from.pointer("/value/0/address")
                .and_then(Value::as_str)
                .or_else(|| from.as_str())
                .unwrap_or_default()
        })
        .unwrap_or_default()
        .to_string();

    if !is_valid_email(&sender) {
        errors.push(
            ErrorDetail::new(
                DetailCode::InvalidEmailAddress,
                Severity::Critical,
                format!("Sender address '{}' is not a valid email", sender.trim()),
            )
            .with_field("from"),
        );
    }
    let client_email = sanitize_email(&sender);

    let body = payload
        .get("text")
        .and_then(Value::as_str)
        .or_else(|| payload.get("snippet").and_then(Value::as_str))
        .unwrap_or_default();
    let subject = payload
        .get("subject")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let extracted = extract_brief(body, subject);
    let client_brief = sanitize_text(&extracted.text);
    let brief_len = client_brief.chars().count();
    if brief_len < MIN_BRIEF_CHARS {
        errors.push(
            ErrorDetail::new(
                DetailCode::InvalidBriefLength,
                Severity::Critical,
                format!(
                    "Client brief is too short ({} chars, minimum {})",
                    brief_len, MIN_BRIEF_CHARS
                ),
            )
            .with_field("text")
            .with_context("actualLength", json!(brief_len)),
        );
    }

    if let Some(message_id) = payload.get("id") {
        metadata.insert("messageId".to_string(), message_id.clone());
    }
    if let Some(thread_id) = payload.get("threadId") {
        metadata.insert("threadId".to_string(), thread_id.clone());
    }
    metadata.insert("briefOrigin".to_string(), json!(extracted.origin.as_str()));

    finalize(
        Source::Email,
        non_empty(client_brief),
        non_empty(client_email),
        errors,
        metadata,
    )
}

fn normalize_form(payload: &Map<String, Value>) -> NormalizedRequest {
    let mut errors = Vec::new();

    let email_raw = payload
        .get(FORM_EMAIL_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !is_valid_email(email_raw) {
        errors.push(
            ErrorDetail::new(
                DetailCode::InvalidEmailFormat,
                Severity::Critical,
                format!("Submitted email '{}' is not a valid address", email_raw.trim()),
            )
            .with_field(FORM_EMAIL_FIELD),
        );
    }
    let client_email = sanitize_email(email_raw);

    let brief_raw = payload
        .get(FORM_BRIEF_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default();
    let client_brief = sanitize_text(brief_raw);
    let brief_len = client_brief.chars().count();
    if brief_len < MIN_BRIEF_CHARS {
        errors.push(
            ErrorDetail::new(
                DetailCode::MissingClientBrief,
                Severity::Critical,
                format!(
                    "Client brief is missing or too short ({} chars, minimum {})",
                    brief_len, MIN_BRIEF_CHARS
                ),
            )
            .with_field(FORM_BRIEF_FIELD)
            .with_context("actualLength", json!(brief_len)),
        );
    }

    finalize(
        Source::Form,
        non_empty(client_brief),
        non_empty(client_email),
        errors,
        Map::new(),
    )
}

/// Unrecognized shape: record the failure, then salvage what we can.
/// Salvaged values ride along for diagnostics but never clear the error.
fn normalize_unknown(payload: &Map<String, Value>) -> NormalizedRequest {
    let available: Vec<&str> = payload.keys().map(String::as_str).collect();
    let errors = vec![ErrorDetail::new(
        DetailCode::UnknownInputSource,
        Severity::Critical,
        format!(
            "Unrecognized input shape; available fields: {}",
            available.join(", ")
        ),
    )
    .with_context("availableFields", json!(available))];

    let brief_raw = BRIEF_CANDIDATES
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| serde_json::to_string(payload).unwrap_or_default());
    let email_raw = EMAIL_CANDIDATES
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .unwrap_or(UNKNOWN_EMAIL);

    let mut metadata = Map::new();
    metadata.insert("degradedExtraction".to_string(), json!(true));

    finalize(
        Source::Unknown,
        non_empty(sanitize_text(&brief_raw)),
        non_empty(sanitize_email(email_raw)),
        errors,
        metadata,
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Aggregate errors into the final record, upholding the intake invariant:
/// `error == true` iff any detail was recorded, with the critical messages
/// joined into one line.
fn finalize(
    source: Source,
    client_brief: Option<String>,
    client_email: Option<String>,
    errors: Vec<ErrorDetail>,
    metadata: Map<String, Value>,
) -> NormalizedRequest {
    let error = !errors.is_empty();
    let error_message = if error {
        let joined = errors
            .iter()
            .filter(|detail| detail.severity == Severity::Critical)
            .map(|detail| detail.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        if joined.is_empty() {
            // Every error path records at least one critical entry, but a
            // non-empty message is part of the contract regardless
            Some("Input validation failed".to_string())
        } else {
            Some(joined)
        }
    } else {
        None
    };

    if error {
        warn!(
            source = source.as_str(),
            errors = errors.len(),
            "inbound request failed normalization"
        );
    }

    NormalizedRequest {
        client_brief,
        client_email,
        source,
        error,
        errors,
        error_message,
        timestamp: Utc::now(),
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_payload(from: Value, text: &str, subject: &str) -> Value {
        json!({
            "id": "msg-1",
            "threadId": "thr-1",
            "labelIds": ["INBOX"],
            "from": from,
            "text": text,
            "subject": subject
        })
    }

    #[test]
    fn valid_form_submission_normalizes_cleanly() {
        let raw = json!({
            "Client Brief": "Sync Shopify orders to Airtable daily",
            "Your Email": "Test@Example.COM"
        });
        let normalized = normalize(Some(&raw));

        assert!(!normalized.error);
        assert!(normalized.errors.is_empty());
        assert_eq!(normalized.source, Source::Form);
        assert_eq!(normalized.client_email.as_deref(), Some("test@example.com"));
        assert!(normalized
            .client_brief
            .as_deref()
            .unwrap()
            .contains("Shopify orders"));
        assert!(normalized.error_message.is_none());
    }

    #[test]
    fn invalid_form_collects_both_errors() {
        let raw = json!({"Client Brief": "hi", "Your Email": "bad"});
        let normalized = normalize(Some(&raw));

        assert!(normalized.error);
        let codes: Vec<DetailCode> = normalized.errors.iter().map(|e| e.code).collect();
        assert!(codes.contains(&DetailCode::InvalidEmailFormat));
        assert!(codes.contains(&DetailCode::MissingClientBrief));
        let message = normalized.error_message.unwrap();
        assert!(message.contains("not a valid address"));
        assert!(message.contains("; "));
    }

    #[test]
    fn email_with_nested_sender_normalizes() {
        let raw = email_payload(
            json!({"value": [{"address": "Jane@Client.ORG", "name": "Jane"}]}),
            "[BRIEF]\nSend me a daily digest of new Stripe payments\n[END]",
            "automation request",
        );
        let normalized = normalize(Some(&raw));

        assert!(!normalized.error);
        assert_eq!(normalized.source, Source::Email);
        assert_eq!(normalized.client_email.as_deref(), Some("jane@client.org"));
        assert!(normalized
            .client_brief
            .as_deref()
            .unwrap()
            .contains("Stripe payments"));
        assert_eq!(normalized.metadata["briefOrigin"], "delimited");
        assert_eq!(normalized.metadata["messageId"], "msg-1");
    }

    #[test]
    fn email_with_flat_sender_string_normalizes() {
        let raw = email_payload(
            json!("jane@client.org"),
            "Brief: archive attachments from invoices to my drive folder",
            "",
        );
        let normalized = normalize(Some(&raw));
        assert!(!normalized.error);
        assert_eq!(normalized.metadata["briefOrigin"], "brief-line");
    }

    #[test]
    fn email_with_display_name_sender_fails_validation() {
        let raw = email_payload(
            json!("Jane Doe <jane@client.org>"),
            "Automate my weekly report generation for the sales team",
            "",
        );
        let normalized = normalize(Some(&raw));
        assert!(normalized.error);
        assert_eq!(normalized.errors[0].code, DetailCode::InvalidEmailAddress);
    }

    #[test]
    fn email_snippet_is_used_when_text_is_absent() {
        let raw = json!({
            "id": "m", "threadId": "t", "labelIds": [],
            "from": "jane@client.org",
            "snippet": "Connect my helpdesk tickets to a weekly summary email",
        });
        let normalized = normalize(Some(&raw));
        assert!(!normalized.error);
        assert!(normalized
            .client_brief
            .as_deref()
            .unwrap()
            .contains("helpdesk"));
    }

    #[test]
    fn short_email_brief_records_length() {
        let raw = email_payload(json!("jane@client.org"), "hi", "");
        let normalized = normalize(Some(&raw));
        assert!(normalized.error);
        let detail = &normalized.errors[0];
        assert_eq!(detail.code, DetailCode::InvalidBriefLength);
        assert_eq!(detail.context["actualLength"], 2);
    }

    #[test]
    fn signature_only_email_falls_back_to_subject() {
        let raw = email_payload(
            json!("jane@client.org"),
            "--\nJane Doe\nACME",
            "Sync Shopify orders into my accounting tool",
        );
        let normalized = normalize(Some(&raw));
        assert!(!normalized.error);
        assert_eq!(normalized.metadata["briefOrigin"], "subject");
    }

    #[test]
    fn null_input_is_invalid() {
        let normalized = normalize(None);
        assert!(normalized.error);
        assert_eq!(normalized.source, Source::Error);
        assert_eq!(normalized.errors[0].code, DetailCode::InvalidInput);
        assert_eq!(normalized.errors[0].severity, Severity::Critical);
    }

    #[test]
    fn non_object_input_is_invalid() {
        for raw in [json!("string"), json!(42), json!([1, 2])] {
            let normalized = normalize(Some(&raw));
            assert!(normalized.error);
            assert_eq!(normalized.errors[0].code, DetailCode::InvalidInput);
        }
    }

    #[test]
    fn unknown_shape_degrades_but_stays_an_error() {
        let raw = json!({"message": "please automate my invoice filing", "sender": "x@y.zz"});
        let normalized = normalize(Some(&raw));

        assert!(normalized.error);
        assert_eq!(normalized.source, Source::Unknown);
        assert_eq!(normalized.errors[0].code, DetailCode::UnknownInputSource);
        // Degraded extraction still surfaced the candidates
        assert_eq!(normalized.client_email.as_deref(), Some("x@y.zz"));
        assert!(normalized.client_brief.as_deref().unwrap().contains("invoice"));
        assert_eq!(normalized.metadata["degradedExtraction"], true);
    }

    #[test]
    fn unknown_shape_without_candidates_serializes_payload() {
        let raw = json!({"foo": 1, "bar": 2});
        let normalized = normalize(Some(&raw));
        assert!(normalized.error);
        assert_eq!(normalized.client_email.as_deref(), Some(UNKNOWN_EMAIL));
        assert!(normalized.client_brief.as_deref().unwrap().contains("foo"));
    }

    #[test]
    fn renormalizing_degraded_output_is_stable() {
        let raw = json!({"mystery": true});
        let first = normalize(Some(&raw));
        let reserialized = serde_json::to_value(&first).unwrap();
        let second = normalize(Some(&reserialized));

        assert!(matches!(second.source, Source::Unknown | Source::Error));
        assert!(second.error);
    }

    #[test]
    fn email_classification_wins_over_form_fields() {
        let raw = json!({
            "id": "m", "threadId": "t", "labelIds": [],
            "from": "jane@client.org",
            "text": "Automate the thing I described in the form below",
            "Client Brief": "form copy",
            "Your Email": "form@client.org"
        });
        let normalized = normalize(Some(&raw));
        assert_eq!(normalized.source, Source::Email);
        assert_eq!(normalized.client_email.as_deref(), Some("jane@client.org"));
    }

    #[test]
    fn error_invariant_holds_across_shapes() {
        for raw in [
            json!({"Client Brief": "hi", "Your Email": "bad"}),
            json!({"unknown": "shape"}),
            json!({"Client Brief": "Sync Shopify orders to Airtable daily", "Your Email": "a@b.co"}),
        ] {
            let normalized = normalize(Some(&raw));
            assert_eq!(normalized.error, !normalized.errors.is_empty());
            if normalized.error {
                assert!(normalized
                    .errors
                    .iter()
                    .any(|e| e.severity == Severity::Critical));
                assert!(!normalized.error_message.as_deref().unwrap_or("").is_empty());
            } else {
                assert!(normalized.client_brief.is_some());
                assert!(normalized.client_email.is_some());
            }
        }
    }
}
