// crates/parcelscout/src/llm/parse.rs
// Lenient JSON extraction from completion output

use serde::de::DeserializeOwned;

/// Parse one JSON object out of untrusted completion output.
///
/// Tries in order: direct parse of the trimmed content, parse after
/// stripping markdown code fences, parse of the first balanced `{...}`
/// span. Any failure yields `None` - a parse miss degrades the pipeline
/// to fallback search, it never errors.
pub fn parse_json_lenient<T: DeserializeOwned>(content: &str) -> Option<T> {
    let trimmed = content.trim();

    if let Ok(v) = serde_json::from_str::<T>(trimmed) {
        return Some(v);
    }

    let stripped = strip_code_fences(trimmed);
    if stripped != trimmed {
        if let Ok(v) = serde_json::from_str::<T>(stripped) {
            return Some(v);
        }
    }

    let span = extract_object_span(trimmed)?;
    serde_json::from_str::<T>(span).ok()
}

/// Strip enclosing markdown code fences (```json or bare ```).
fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();

    for prefix in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            if let Some(inner) = rest.strip_suffix("```") {
                return inner.trim();
            }
        }
    }

    trimmed
}

/// Locate the first balanced top-level `{...}` span, aware of strings
/// and escapes so braces inside quoted values don't break the count.
fn extract_object_span(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let bytes = s.as_bytes();

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape_next = false;

    for i in start..bytes.len() {
        let ch = bytes[i] as char;

        if escape_next {
            escape_next = false;
            continue;
        }
        if in_string && ch == '\\' {
            escape_next = true;
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }

        if ch == '{' {
            depth += 1;
        } else if ch == '}' {
            depth -= 1;
            if depth == 0 {
                return Some(&s[start..=i]);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    // ========================================================================
    // parse_json_lenient
    // ========================================================================

    #[test]
    fn test_parse_plain_object() {
        let v: Value = parse_json_lenient(r#"{"where": "SALEAMOUNT > 500000"}"#).unwrap();
        assert_eq!(v["where"], "SALEAMOUNT > 500000");
    }

    #[test]
    fn test_parse_fenced_object() {
        let v: Value =
            parse_json_lenient("```json\n{\"limit\": 10}\n```").unwrap();
        assert_eq!(v["limit"], 10);
    }

    #[test]
    fn test_parse_bare_fenced_object() {
        let v: Value = parse_json_lenient("```\n{\"limit\": 5}\n```").unwrap();
        assert_eq!(v["limit"], 5);
    }

    #[test]
    fn test_parse_object_with_surrounding_prose() {
        let input = "Here is the filter you asked for:\n{\"where\": \"YEARBUILT < 1950\"}\nLet me know!";
        let v: Value = parse_json_lenient(input).unwrap();
        assert_eq!(v["where"], "YEARBUILT < 1950");
    }

    #[test]
    fn test_parse_failure_is_none() {
        assert!(parse_json_lenient::<Value>("no structured result here").is_none());
        assert!(parse_json_lenient::<Value>("").is_none());
    }

    // ========================================================================
    // extract_object_span
    // ========================================================================

    #[test]
    fn test_extract_nested_object() {
        let input = r#"text {"a": {"b": 1}} tail"#;
        assert_eq!(extract_object_span(input), Some(r#"{"a": {"b": 1}}"#));
    }

    #[test]
    fn test_extract_braces_inside_strings() {
        let input = r#"{"msg": "use {curly} braces"}"#;
        assert_eq!(extract_object_span(input), Some(input));
    }

    #[test]
    fn test_extract_escaped_quotes() {
        let input = r#"{"msg": "say \"hi\""}"#;
        assert_eq!(extract_object_span(input), Some(input));
    }

    #[test]
    fn test_extract_unbalanced_is_none() {
        assert_eq!(extract_object_span(r#"{"a": 1"#), None);
    }

    // ========================================================================
    // strip_code_fences
    // ========================================================================

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }
}
