// crates/parcelscout/src/resolve/fallback.rs
// Case-insensitive substring search - the universal safety net

use super::{quote_literal, RequestContext};
use crate::error::Result;
use crate::services::{FeatureQuery, FeatureQueryService};
use parcelscout_types::FeatureRecord;
use tracing::debug;

/// Substring filter over the configured address field. No result cap
/// beyond the service default.
pub fn fallback_filter(field: &str, term: &str) -> String {
    let term = quote_literal(term.trim()).to_uppercase();
    format!("UPPER({field}) LIKE '%{term}%'")
}

/// Execute the fallback search. Always terminates the pipeline with some
/// outcome - zero hits normalize to NoMatch, never another retry.
pub async fn fallback_search(
    features: &dyn FeatureQueryService,
    ctx: &RequestContext<'_>,
    term: &str,
) -> Result<(Vec<FeatureRecord>, String)> {
    let filter = fallback_filter(&ctx.config.address_field, term);
    debug!(filter = %filter, "fallback text search");

    let request = FeatureQuery::with_where(filter.clone());
    let records = features.query(&request).await?;
    Ok((records, filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_filter_uppercases_term() {
        assert_eq!(
            fallback_filter("SITEADDRESS", "cedar lane"),
            "UPPER(SITEADDRESS) LIKE '%CEDAR LANE%'"
        );
    }

    #[test]
    fn test_fallback_filter_escapes_quotes() {
        assert_eq!(
            fallback_filter("SITEADDRESS", "o'hara"),
            "UPPER(SITEADDRESS) LIKE '%O''HARA%'"
        );
    }
}
