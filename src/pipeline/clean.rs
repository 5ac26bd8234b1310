//! Deterministic cleanup of LLM responses before JSON parsing.
//!
//! Even with `response_format: json_object`, hosted models occasionally
//! return output that is *semantically* the requested JSON but fails
//! `serde_json::from_str` as-is:
//!
//! - wrapped in ` ```json ... ``` ` fences
//! - prefixed with a short apology or "Here is the JSON:" line
//! - sprinkled with zero-width spaces or a BOM
//!
//! A few cheap string/regex rules fix these without touching content.
//! Keeping them here rather than in the prompt means the prompt stays
//! focused on the schema, not on formatting edge-cases. Each rule is
//! independently testable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to a raw LLM response.
///
/// Rules (applied in order):
/// 1. Strip outer code fences (models sometimes disobey the prompt)
/// 2. Strip invisible Unicode (zero-width spaces, BOM, word joiners)
/// 3. Trim surrounding whitespace
/// 4. If the result still doesn't start with `{` or `[`, keep only the
///    span between the first `{` and the last `}` — drops chatty prefixes
///    and suffixes around an otherwise valid object
pub fn clean_json_response(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = strip_invisible_chars(&s);
    let s = s.trim();
    extract_json_span(s)
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Strip invisible Unicode ──────────────────────────────────────

const INVISIBLE: [char; 5] = ['\u{200B}', '\u{FEFF}', '\u{200C}', '\u{200D}', '\u{2060}'];

fn strip_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

// ── Rule 4: Keep the outermost JSON object span ──────────────────────────

fn extract_json_span(input: &str) -> String {
    if input.starts_with('{') || input.starts_with('[') {
        return input.to_string();
    }
    match (input.find('{'), input.rfind('}')) {
        (Some(start), Some(end)) if start < end => input[start..=end].to_string(),
        _ => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_passes_through_unchanged() {
        let s = r#"{"doctor": "Dr. A"}"#;
        assert_eq!(clean_json_response(s), s);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let s = "```json\n{\"doctor\": \"Dr. A\"}\n```";
        assert_eq!(clean_json_response(s), r#"{"doctor": "Dr. A"}"#);
    }

    #[test]
    fn bare_fences_are_unwrapped() {
        let s = "```\n{\"a\": 1}\n```";
        assert_eq!(clean_json_response(s), r#"{"a": 1}"#);
    }

    #[test]
    fn chatty_prefix_is_dropped() {
        let s = "Here is the JSON you asked for:\n{\"a\": 1}";
        assert_eq!(clean_json_response(s), r#"{"a": 1}"#);
    }

    #[test]
    fn invisible_chars_are_removed() {
        let s = "\u{FEFF}{\"a\":\u{200B} 1}";
        assert_eq!(clean_json_response(s), r#"{"a": 1}"#);
    }

    #[test]
    fn garbage_without_braces_is_left_alone() {
        // The caller's serde parse will fail and report the snippet.
        let s = "I could not read the prescription.";
        assert_eq!(clean_json_response(s), s);
    }
}
