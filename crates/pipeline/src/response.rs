//! Recovery of the JSON payload from raw generation text.
//!
//! Order: strip an optional fenced code block, parse; on failure take the
//! first balanced top-level `{...}` span and parse that. Later spans are
//! never tried.

use std::sync::LazyLock;

use serde_json::Value;

use crate::error::PipelineError;

static FENCE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("valid regex")
});

/// Contents of the first fenced code block, or the trimmed input when
/// there is none.
pub fn strip_code_fence(text: &str) -> &str {
    match FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text.trim(),
    }
}

/// The first balanced top-level `{...}` span. Braces inside JSON strings
/// are ignored.
pub fn first_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the JSON object carried by `text`.
pub fn recover_json(text: &str) -> Result<Value, PipelineError> {
    let body = strip_code_fence(text);
    let direct_err = match serde_json::from_str::<Value>(body) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let span = first_object_span(body)
        .ok_or_else(|| PipelineError::Parse(format!("no JSON object found ({direct_err})")))?;
    tracing::debug!(span_chars = span.len(), "Direct parse failed, retrying with extracted object");
    serde_json::from_str(span).map_err(|e| PipelineError::Parse(e.to_string()))
}
