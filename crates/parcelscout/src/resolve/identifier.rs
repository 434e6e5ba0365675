// crates/parcelscout/src/resolve/identifier.rs
// Direct identifier lookup - deterministic, no AI involvement

use super::{quote_literal, RequestContext};
use crate::error::Result;
use crate::services::{FeatureQuery, FeatureQueryService};
use parcelscout_types::FeatureRecord;
use tracing::debug;

/// Equality lookup against the configured identifier field, capped at one
/// result. Returns the records and the filter that was executed.
pub async fn identifier_lookup(
    features: &dyn FeatureQueryService,
    ctx: &RequestContext<'_>,
    identifier: &str,
) -> Result<(Vec<FeatureRecord>, String)> {
    let filter = equality_filter(&ctx.config.identifier_field, identifier);
    debug!(filter = %filter, "identifier lookup");

    let request = FeatureQuery::with_where(filter.clone()).with_limit(1);
    let records = features.query(&request).await?;
    Ok((records, filter))
}

fn equality_filter(field: &str, identifier: &str) -> String {
    format!("{} = '{}'", field, quote_literal(identifier.trim()))
}
