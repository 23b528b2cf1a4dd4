//! Brief extraction from email bodies
//!
//! Clients rarely follow instructions. The extraction ladder: an explicit
//! `[BRIEF] ... [END]` block, a `Brief:` line, the whole body. Whatever is
//! selected then loses its trailing signature block, and the subject line
//! steps in only when nothing readable is left.

use once_cell::sync::Lazy;
use regex::Regex;

static BRIEF_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\[BRIEF\](.*?)\[END\]").expect("valid regex"));

static BRIEF_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*Brief:[ \t]*(.+)$").expect("valid regex"));

/// Closers that start a signature block; everything from the matching line
/// down is dropped
const SIGNATURE_MARKERS: &[&str] = &[
    "best regards",
    "kind regards",
    "warm regards",
    "regards,",
    "best,",
    "cheers,",
    "thanks,",
    "thank you,",
    "sincerely",
    "sent from",
];

/// Which rung of the extraction ladder produced the brief
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefOrigin {
    Delimited,
    BriefLine,
    Body,
    Subject,
}

impl BriefOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            BriefOrigin::Delimited => "delimited",
            BriefOrigin::BriefLine => "brief-line",
            BriefOrigin::Body => "body",
            BriefOrigin::Subject => "subject",
        }
    }
}

/// Brief text pulled out of an email, before sanitization
#[derive(Debug, Clone)]
pub struct ExtractedBrief {
    pub text: String,
    pub origin: BriefOrigin,
}

/// Drop everything from the first signature delimiter or closer line down
pub fn strip_signature(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed == "--" {
            break;
        }
        let lower = trimmed.to_lowercase();
        if SIGNATURE_MARKERS
            .iter()
            .any(|marker| lower.starts_with(marker))
        {
            break;
        }
        kept.push(line);
    }
    kept.join("\n")
}

/// Run the extraction ladder over body and subject
pub fn extract_brief(body: &str, subject: &str) -> ExtractedBrief {
    let (candidate, origin) = if let Some(captures) = BRIEF_BLOCK.captures(body) {
        (captures[1].to_string(), BriefOrigin::Delimited)
    } else if let Some(captures) = BRIEF_LINE.captures(body) {
        (captures[1].to_string(), BriefOrigin::BriefLine)
    } else {
        (body.to_string(), BriefOrigin::Body)
    };

    let stripped = strip_signature(&candidate);
    if stripped.trim().is_empty() {
        return ExtractedBrief {
            text: subject.to_string(),
            origin: BriefOrigin::Subject,
        };
    }

    ExtractedBrief {
        text: stripped,
        origin,
    }
}
