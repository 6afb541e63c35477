//! Extraction of JSON payloads from LLM replies.
//!
//! Models frequently wrap JSON in markdown fences or prose despite
//! JSON-only instructions, so parsing tries, in order: the whole reply, a
//! fenced ```json block, and the first balanced object/array in the text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap());

/// Pull the first JSON object out of a reply
pub fn extract_object(reply: &str) -> Option<Value> {
    extract_with(reply, '{', '}')
        .filter(|v| v.is_object())
}

/// Pull the first JSON array out of a reply
pub fn extract_array(reply: &str) -> Option<Value> {
    extract_with(reply, '[', ']')
        .filter(|v| v.is_array())
}

fn extract_with(reply: &str, open: char, close: char) -> Option<Value> {
    let trimmed = reply.trim();

    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return Some(v);
    }

    if let Some(caps) = FENCED_JSON.captures(trimmed) {
        if let Ok(v) = serde_json::from_str::<Value>(caps[1].trim()) {
            return Some(v);
        }
    }

    balanced_slice(trimmed, open, close)
        .and_then(|s| serde_json::from_str::<Value>(s).ok())
}

/// First balanced `open`..`close` span, brace-counting but quote-aware
fn balanced_slice(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_json() {
        let v = extract_object(r#"{"score": 85}"#).unwrap();
        assert_eq!(v["score"], 85);
    }

    #[test]
    fn test_fenced_json() {
        let reply = "Here is the result:\n```json\n{\"score\": 72}\n```\nDone.";
        let v = extract_object(reply).unwrap();
        assert_eq!(v["score"], 72);
    }

    #[test]
    fn test_embedded_object() {
        let reply = "Sure! The analysis gives {\"overall\": 64, \"note\": \"has {braces} inside\"} as requested.";
        let v = extract_object(reply).unwrap();
        assert_eq!(v["overall"], 64);
    }

    #[test]
    fn test_array() {
        let reply = "Keywords:\n[\"alpha\", \"beta\"]";
        let v = extract_array(reply).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_no_json() {
        assert!(extract_object("no json here").is_none());
        assert!(extract_array("still nothing").is_none());
    }

    #[test]
    fn test_array_not_confused_with_object() {
        // extract_object must not return an array
        assert!(extract_object("[1, 2, 3]").is_none());
    }
}
