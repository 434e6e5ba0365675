// crates/parcelscout/src/resolve/mod.rs
// Resolution strategies: identifier lookup, address resolution, fallback search

mod address;
mod fallback;
mod identifier;

pub use address::{resolve_address, AddressResolution};
pub use fallback::{fallback_filter, fallback_search};
pub use identifier::identifier_lookup;

use crate::config::SearchConfig;

/// Request-scoped context threaded by value into each strategy call.
/// Nothing here is ambient or global; one is built per submission.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    pub config: &'a SearchConfig,
    /// Session memory rendered for prompt construction
    pub session_summary: String,
    /// Monotonic submission sequence number within the session
    pub sequence: u64,
}

/// Escape a value for embedding in a single-quoted SQL-style literal.
pub(crate) fn quote_literal(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_literal_doubles_single_quotes() {
        assert_eq!(quote_literal("O'BRIEN"), "O''BRIEN");
        assert_eq!(quote_literal("plain"), "plain");
    }
}
