//! Locating JSON inside free-form model output.
//!
//! Models often wrap JSON in markdown fences or surround it with commentary.
//! Extraction tries, in order:
//! 1. A fenced block: ```json ... ``` (or an unlabeled fence holding JSON)
//! 2. The first balanced object or array that decodes as JSON, scanning
//!    opening brackets left to right so `{placeholders}` in prose are skipped
//!
//! Nothing is ever guessed from prose: no JSON means a parse error.

use serde::de::DeserializeOwned;
use sprout_error::{ParseError, SproutResult};

const PREVIEW_CHARS: usize = 100;

/// Find the JSON text in a model response.
///
/// # Errors
///
/// Returns a [`ParseError`] if the response contains no JSON object or array.
///
/// # Examples
///
/// ```
/// use sprout_generation::extract_json;
///
/// let response = "Here is your plan:\n```json\n{\"title\": \"Shapes\"}\n```\nEnjoy!";
/// assert_eq!(extract_json(response).unwrap(), "{\"title\": \"Shapes\"}");
///
/// let inline = "Sure! {\"title\": \"Shapes\"} Let me know.";
/// assert_eq!(extract_json(inline).unwrap(), "{\"title\": \"Shapes\"}");
/// ```
pub fn extract_json(response: &str) -> SproutResult<&str> {
    if let Some(json) = extract_from_code_block(response) {
        return Ok(json);
    }

    let mut first_balanced = None;
    for (start, bracket) in response.match_indices(['{', '[']) {
        let (open, close) = if bracket == "{" { ('{', '}') } else { ('[', ']') };
        let Some(span) = extract_balanced(&response[start..], open, close) else {
            continue;
        };
        if serde_json::from_str::<serde::de::IgnoredAny>(span).is_ok() {
            return Ok(span);
        }
        first_balanced.get_or_insert(span);
    }

    // Malformed JSON still goes to the decoder so the error carries its reason.
    if let Some(span) = first_balanced {
        tracing::debug!(span_length = span.len(), "No span decoded, using first balanced span");
        return Ok(span);
    }

    tracing::error!(
        response_length = response.len(),
        "No JSON found in model response"
    );
    Err(ParseError::new(format!(
        "No JSON found in response (length: {})",
        response.len()
    ))
    .into())
}

/// Content of the first ```json fence, or of the first unlabeled fence
/// whose content looks like JSON. An unterminated fence runs to the end of
/// the response.
fn extract_from_code_block(response: &str) -> Option<&str> {
    if let Some(start) = response.find("```json") {
        let content_start = start + "```json".len();
        return Some(fenced_content(response, content_start));
    }

    let start = response.find("```")?;
    let after_fence = start + 3;
    let content_start = response[after_fence..]
        .find('\n')
        .map(|n| after_fence + n + 1)
        .unwrap_or(after_fence);
    let content = fenced_content(response, content_start);
    content.starts_with(['{', '[']).then_some(content)
}

fn fenced_content(response: &str, content_start: usize) -> &str {
    let rest = &response[content_start..];
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// Text from the leading `open` to its matching `close`, skipping
/// delimiters inside string literals.
fn extract_balanced(text: &str, open: char, close: char) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escape_next => escape_next = false,
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..i + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Decode extracted JSON into `T`.
///
/// # Errors
///
/// Returns a [`ParseError`] if the text is not valid JSON for `T`. The raw
/// text only appears, truncated, in the error log.
pub fn parse_json<T>(json_str: &str) -> SproutResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(json_str).map_err(|e| {
        let preview: String = json_str.chars().take(PREVIEW_CHARS).collect();
        tracing::error!(error = %e, json_preview = %preview, "JSON parsing failed");
        ParseError::new(format!("Failed to parse JSON: {}", e)).into()
    })
}
