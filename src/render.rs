//! HTML rendering with mandatory escaping
//!
//! Every HTML fragment the pipeline emits is assembled here, and every
//! dynamic value is routed through [`escape`] before interpolation. The
//! artifact name, QA issues, and error messages all originate from an LLM
//! whose output embeds the original untrusted user brief, so no caller may
//! concatenate raw text into markup.

use crate::envelope::{ErrorDetail, Source};

/// Map `& < > " '` to their HTML entities.
///
/// Single pass over chars, so already-escaped input never double-escapes
/// its own ampersands into `&amp;amp;`-style artifacts.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Human-readable summary of a freshly generated workflow (stage 3)
pub fn workflow_summary(
    name: &str,
    source: Source,
    node_count: usize,
    connection_count: usize,
) -> String {
    format!(
        "<h2>Workflow generated: {}</h2>\
         <p>Built from your {} request.</p>\
         <ul><li>{} nodes</li><li>{} connection groups</li></ul>\
         <p>Automated validation is running next; results are attached below.</p>",
        escape(name),
        escape(source.as_str()),
        node_count,
        connection_count,
    )
}

/// QA report table plus issue list (stage 5, happy path)
pub fn qa_report(
    valid: bool,
    confidence: f64,
    issues: &[String],
    summary: &str,
    source: Source,
    rule_failures: &[(&'static str, &'static str)],
) -> String {
    let status = if valid && rule_failures.is_empty() {
        "Passed"
    } else {
        "Needs attention"
    };

    let mut html = format!(
        "<h3>Validation report</h3>\
         <table>\
         <tr><td>Status</td><td>{}</td></tr>\
         <tr><td>Confidence</td><td>{:.1}%</td></tr>\
         <tr><td>Issues found</td><td>{}</td></tr>\
         <tr><td>Source</td><td>{}</td></tr>\
         </table>",
        status,
        confidence * 100.0,
        issues.len() + rule_failures.len(),
        escape(source.as_str()),
    );

    if !issues.is_empty() || !rule_failures.is_empty() {
        html.push_str("<ul>");
        for issue in issues {
            html.push_str(&format!("<li>{}</li>", escape(issue)));
        }
        for (rule, description) in rule_failures {
            html.push_str(&format!(
                "<li>Structural check failed ({}): {}</li>",
                escape(rule),
                escape(description)
            ));
        }
        html.push_str("</ul>");
    }

    html.push_str(&format!("<p>{}</p>", escape(summary)));
    html
}

/// QA fragment for the degraded paths: validator unavailable, empty
/// response, or unparsable output. `detail` is escaped here.
pub fn qa_failure(detail: &str) -> String {
    format!(
        "<h3>Validation report</h3>\
         <p>Automated validation could not be completed. \
         The generated workflow is attached unreviewed.</p>\
         <p>{}</p>",
        escape(detail)
    )
}

/// Full error notification body (stage 6, normal path)
pub fn error_report(
    stage: &str,
    message: &str,
    source: Source,
    details: &[ErrorDetail],
) -> String {
    let mut html = format!(
        "<h2>We could not generate your workflow</h2>\
         <table>\
         <tr><td>Stage</td><td>{}</td></tr>\
         <tr><td>Source</td><td>{}</td></tr>\
         </table>\
         <p>{}</p>",
        escape(stage),
        escape(source.as_str()),
        escape(message),
    );

    if !details.is_empty() {
        html.push_str("<ul>");
        for detail in details {
            html.push_str(&format!(
                "<li><strong>{}</strong> ({:?}): {}</li>",
                escape(detail.code.as_str()),
                detail.severity,
                escape(&detail.message)
            ));
        }
        html.push_str("</ul>");
    }

    html.push_str(NEXT_STEPS_HTML);
    html
}

/// Static next-steps block appended to every error notification
pub const NEXT_STEPS_HTML: &str = "<h3>Next steps</h3>\
     <ul>\
     <li>Reply to this email with a fuller description of the automation you need.</li>\
     <li>Include the systems involved and how often it should run.</li>\
     <li>We review every failed request within one business day.</li>\
     </ul>";

/// Minimal, pre-escaped template used when the error reporter itself fails.
/// Contains no interpolation so it can never carry unescaped input.
pub const FALLBACK_ERROR_HTML: &str = "<h2>We could not process your request</h2>\
     <p>An unexpected internal error occurred while preparing your report. \
     Our team has been notified.</p>";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{DetailCode, Severity};

    #[test]
    fn escape_covers_all_dangerous_chars() {
        let escaped = escape("<script>alert(\"x&y's\")</script>");
        assert!(!escaped.contains('<'));
        assert!(!escaped.contains('>'));
        assert!(!escaped.contains('"'));
        assert!(!escaped.contains('\''));
        assert!(escaped.contains("&lt;script&gt;"));
        assert!(escaped.contains("&quot;"));
        assert!(escaped.contains("&#39;"));
        assert!(escaped.contains("&amp;"));
    }

    #[test]
    fn escape_is_single_pass() {
        // An ampersand already part of an entity still escapes exactly once
        assert_eq!(escape("&lt;"), "&amp;lt;");
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape("plain text 123"), "plain text 123");
    }

    #[test]
    fn summary_escapes_artifact_name() {
        let html = workflow_summary("<script>x</script>", Source::Form, 3, 2);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn qa_report_escapes_issues_and_summary() {
        let issues = vec!["node <hook> misconfigured".to_string()];
        let html = qa_report(false, 0.5, &issues, "see <above>", Source::Email, &[]);
        assert!(html.contains("&lt;hook&gt;"));
        assert!(html.contains("&lt;above&gt;"));
        assert!(!html.contains("<hook>"));
    }

    #[test]
    fn qa_report_formats_confidence_to_one_decimal() {
        let html = qa_report(true, 0.876, &[], "ok", Source::Form, &[]);
        assert!(html.contains("87.6%"));
    }

    #[test]
    fn qa_report_counts_rule_failures_as_issues() {
        let failures = [("unique-node-ids", "all node identifiers are distinct")];
        let html = qa_report(true, 0.95, &[], "ok", Source::Form, &failures);
        assert!(html.contains("Needs attention"));
        assert!(html.contains("unique-node-ids"));
    }

    #[test]
    fn error_report_escapes_every_field() {
        let details = vec![ErrorDetail::new(
            DetailCode::InvalidEmailAddress,
            Severity::Critical,
            "bad <address>",
        )];
        let html = error_report("architect-parse", "<b>boom</b>", Source::Unknown, &details);
        assert!(html.contains("&lt;b&gt;boom&lt;/b&gt;"));
        assert!(html.contains("bad &lt;address&gt;"));
        assert!(html.contains("Next steps"));
        assert!(!html.contains("<b>boom"));
    }
}
