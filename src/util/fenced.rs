//! Markdown fence stripping for LLM responses
//!
//! Model output that should be JSON routinely arrives wrapped in a
//! triple-backtick code block, with or without a `json` language tag and
//! with or without surrounding prose. Every stage that parses model output
//! goes through this one extractor.

/// Extract the body of the first fenced code block, if any.
///
/// Accepts a fence tagged ```` ```json ```` or a bare ```` ``` ````. When the
/// text carries no fence the trimmed text itself is returned; parsing the
/// result as JSON is the caller's job.
pub fn extract_json_block(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[open + 3..];

    // The rest of the fence line is a language tag; the block body starts on
    // the next line. An opening fence with nothing after it has no body.
    let body_start = match after_fence.find('\n') {
        Some(nl) => nl + 1,
        None => return trimmed,
    };
    let body = &after_fence[body_start..];
    let body = match body.find("```") {
        Some(close) => &body[..close],
        None => body,
    };
    body.trim()
}
