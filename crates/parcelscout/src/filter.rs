// crates/parcelscout/src/filter.rs
// Safety validation for machine-generated filters

use regex::Regex;
use std::sync::LazyLock;

static NUMERIC_EQUALITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*=\s*(\d+(?:\.\d+)?)$").unwrap());

static STRING_EQUALITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^'([^']*)'\s*=\s*'([^']*)'$").unwrap());

/// Reject filters that are unrestricted (tautological) and therefore unsafe
/// to execute against a large dataset.
///
/// This is a conservative pattern match over the degenerate forms a language
/// model tends to emit ("1=1", "'a'='a'", bare "true"), not a general
/// predicate evaluator. Semantically-unrestricted filters written in other
/// forms (e.g. `FIELD > -999999999`) pass through by design.
pub fn is_unrestricted(filter: &str) -> bool {
    let normalized = normalize_whitespace(filter);
    if normalized.is_empty() {
        return true;
    }

    let stripped = strip_outer_parens(&normalized);
    if stripped.is_empty() {
        return true;
    }
    let lower = stripped.to_lowercase();

    if lower == "1" || lower == "true" || lower == "not false" {
        return true;
    }

    if let Some(caps) = NUMERIC_EQUALITY_RE.captures(stripped) {
        let lhs: f64 = caps[1].parse().unwrap_or(f64::NAN);
        let rhs: f64 = caps[2].parse().unwrap_or(f64::NAN);
        if lhs == rhs {
            return true;
        }
    }

    if let Some(caps) = STRING_EQUALITY_RE.captures(stripped) {
        if caps[1] == caps[2] {
            return true;
        }
    }

    false
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip balanced enclosing paren pairs, repeatedly.
/// "(1=1)" and "((1=1))" both reduce to "1=1"; "(a=1) OR (b=2)" is untouched.
fn strip_outer_parens(s: &str) -> &str {
    let mut current = s.trim();
    while let Some(inner) = enclosing_paren_content(current) {
        current = inner.trim();
    }
    current
}

fn enclosing_paren_content(s: &str) -> Option<&str> {
    if !s.starts_with('(') || !s.ends_with(')') || s.len() < 2 {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                // the opening paren must close at the very end
                if depth == 0 && i != s.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
    }
    Some(&s[1..s.len() - 1])
}
