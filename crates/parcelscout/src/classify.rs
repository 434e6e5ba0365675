// crates/parcelscout/src/classify.rs
// Free-text query classification (identifier / address / freeform)

use parcelscout_types::QueryClassification;
use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)[A-Z0-9-]{5,}$").unwrap());

/// Street-suffix abbreviations accepted at the end of an address
const STREET_SUFFIXES: &[&str] = &[
    "st", "ave", "ln", "rd", "dr", "ct", "blvd", "way", "pl", "cir", "ter", "pkwy",
];

/// Interrogative/aggregation keywords that force Freeform classification.
/// "306 properties sold last year" must never route into address lookup.
const QUERY_KEYWORDS: &[&str] = &[
    "what", "which", "where", "how", "show", "find", "list", "give", "top", "largest",
    "smallest", "biggest", "most", "least", "recent", "newest", "oldest", "sold", "sale",
    "sales", "between", "greater", "less", "than", "over", "under", "average", "count",
    "highest", "lowest", "properties", "parcels", "owned", "built",
];

/// Maximum word count (numeric token included) for the bare
/// leading-number address form
const BARE_NUMERIC_ADDRESS_MAX_TOKENS: usize = 6;

/// Classify a raw search string. Total function - never errors.
///
/// Priority order: identifier pattern, then address shape, then freeform.
/// Keyword presence always wins over address shape.
pub fn classify(text: &str) -> QueryClassification {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return QueryClassification::Freeform;
    }

    if !trimmed.contains(char::is_whitespace) && IDENTIFIER_RE.is_match(trimmed) {
        return QueryClassification::Identifier;
    }

    let tokens: Vec<String> = trimmed
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| c == ',' || c == '.' || c == '?')
                .to_lowercase()
        })
        .collect();

    if tokens.iter().any(|t| QUERY_KEYWORDS.contains(&t.as_str())) {
        return QueryClassification::Freeform;
    }

    if tokens.first().is_some_and(|t| is_numeric_token(t)) {
        if tokens.last().is_some_and(|t| is_street_suffix(t)) {
            return QueryClassification::Address;
        }
        if tokens.len() <= BARE_NUMERIC_ADDRESS_MAX_TOKENS {
            return QueryClassification::Address;
        }
    }

    QueryClassification::Freeform
}

fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn is_street_suffix(token: &str) -> bool {
    STREET_SUFFIXES.contains(&token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use QueryClassification::*;

    // ========================================================================
    // Identifier rule
    // ========================================================================

    #[test]
    fn test_identifier_patterns() {
        for input in ["123-456-789", "ABC12", "abc12", "1234567890", "R-2024-00317"] {
            assert_eq!(classify(input), Identifier, "input: {input}");
        }
    }

    #[test]
    fn test_identifier_requires_five_chars() {
        assert_eq!(classify("AB12"), Freeform);
        assert_eq!(classify("A-1"), Freeform);
    }

    #[test]
    fn test_identifier_rejects_whitespace() {
        assert_ne!(classify("ABC 12345"), Identifier);
    }

    #[test]
    fn test_short_bare_number_is_address_not_identifier() {
        // "306" is under the 5-char identifier floor; the bare numeric
        // address form picks it up instead
        assert_eq!(classify("306"), Address);
    }

    // ========================================================================
    // Address rule
    // ========================================================================

    #[test]
    fn test_address_with_suffix() {
        for input in [
            "306 Cedar Ln",
            "123 Main St",
            "4500 Brook Hollow Pkwy",
            "77 Sunset Blvd.",
        ] {
            assert_eq!(classify(input), Address, "input: {input}");
        }
    }

    #[test]
    fn test_address_bare_numeric_short_form() {
        assert_eq!(classify("306 Cedar Lane"), Address);
        assert_eq!(classify("1200 North Capitol Avenue Apt 4"), Address);
    }

    #[test]
    fn test_long_numeric_leading_text_without_suffix_is_freeform() {
        assert_eq!(
            classify("306 permits were issued for the new riverside housing development"),
            Freeform
        );
    }

    #[test]
    fn test_non_numeric_lead_is_freeform() {
        assert_eq!(classify("Cedar Lane 306"), Freeform);
    }

    // ========================================================================
    // Keyword precedence
    // ========================================================================

    #[test]
    fn test_keywords_force_freeform() {
        for input in [
            "306 properties sold last year",
            "show me the 10 largest sales in 2023",
            "123 Main St sold recently",
            "which parcels are over 5 acres",
            "top 5 sales",
        ] {
            assert_eq!(classify(input), Freeform, "input: {input}");
        }
    }

    #[test]
    fn test_keyword_match_ignores_punctuation_and_case() {
        assert_eq!(classify("306 Cedar Ln, SOLD?"), Freeform);
    }

    // ========================================================================
    // Degenerate input
    // ========================================================================

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(classify(""), Freeform);
        assert_eq!(classify("   "), Freeform);
    }
}
