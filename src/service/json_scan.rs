//! Locate a JSON object inside free-form model output.
//!
//! Models often wrap their answer in prose or markdown fences. The scanner
//! walks each `{` in order, finds its balanced closing brace (ignoring braces
//! inside string literals) and returns the first candidate that parses as a
//! JSON object. A malformed candidate is skipped as a whole so that a nested
//! fragment of it is never mistaken for the answer. A `{` that is never
//! closed is stray text: scanning resumes right after it.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("no JSON object found in response")]
    NoObject,

    #[error("JSON object starting at byte {start} is never closed")]
    Unterminated { start: usize },

    #[error("malformed JSON object: {0}")]
    Malformed(String),
}

/// Extract the first well-formed JSON object from `text`.
pub fn extract_json_object(text: &str) -> Result<Value, ScanError> {
    let mut from = 0;
    let mut last_err = None;

    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        let Some(len) = balanced_len(&text[start..]) else {
            if !matches!(last_err, Some(ScanError::Unterminated { .. })) {
                last_err = Some(ScanError::Unterminated { start });
            }
            from = start + 1;
            continue;
        };

        let candidate = &text[start..start + len];
        match serde_json::from_str::<Map<String, Value>>(candidate) {
            Ok(map) => return Ok(Value::Object(map)),
            Err(e) => {
                last_err = Some(ScanError::Malformed(e.to_string()));
                from = start + len;
            }
        }
    }

    Err(last_err.unwrap_or(ScanError::NoObject))
}

/// Byte length of the brace-balanced object at the start of `s`.
/// `s` must begin with `{`. Quotes and braces are ASCII, so a byte walk is
/// safe on UTF-8 input.
fn balanced_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in s.as_bytes().iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}
