// crates/parcelscout/src/resolve/address.rs
// Address resolution: address index, then geocoder, then point intersection

use super::{quote_literal, RequestContext};
use crate::error::Result;
use crate::services::{FeatureQuery, FeatureQueryService, GeocodeService};
use parcelscout_types::{FeatureRecord, GeoPoint};
use tracing::debug;

/// What address resolution produced. `point: None` means neither the
/// address index nor the geocoder yielded a coordinate; the caller
/// degrades to fallback text search.
#[derive(Debug)]
pub struct AddressResolution {
    pub features: Vec<FeatureRecord>,
    pub point: Option<GeoPoint>,
}

/// Two-step coordinate resolution, then a spatial intersection against
/// the primary layer.
///
/// The intersection is an exact point query capped at one result - no
/// buffering or tolerance expansion. Buffered queries leaked multiple
/// parcels for what must always be a single-parcel answer.
pub async fn resolve_address(
    primary: &dyn FeatureQueryService,
    address_index: Option<&dyn FeatureQueryService>,
    geocoder: Option<&dyn GeocodeService>,
    ctx: &RequestContext<'_>,
    text: &str,
) -> Result<AddressResolution> {
    let mut point: Option<GeoPoint> = None;

    // Step 1: the address-point index
    if let Some(index) = address_index {
        let filter = index_filter(
            &ctx.config.address_index_field,
            text,
            ctx.config.address_index_exact,
        );
        debug!(filter = %filter, "address index lookup");
        let request = FeatureQuery::with_where(filter).with_limit(1);
        let hits = index.query(&request).await?;
        point = hits
            .first()
            .and_then(|f| f.center())
            .map(|(x, y)| GeoPoint::new(x, y));
    }

    // Step 2: generic geocoding
    if point.is_none() {
        if let Some(geocoder) = geocoder {
            point = geocoder.geocode(text).await?;
            if let Some(ref p) = point {
                debug!(label = ?p.label, "geocoder produced candidate");
            }
        }
    }

    match point {
        Some(p) => {
            let request = FeatureQuery::intersecting(p.clone());
            let features = primary.query(&request).await?;
            Ok(AddressResolution {
                features,
                point: Some(p),
            })
        }
        None => {
            debug!("no coordinate from index or geocoder");
            Ok(AddressResolution {
                features: Vec::new(),
                point: None,
            })
        }
    }
}

fn index_filter(field: &str, text: &str, exact: bool) -> String {
    let term = quote_literal(text.trim()).to_uppercase();
    if exact {
        format!("UPPER({field}) = '{term}'")
    } else {
        format!("UPPER({field}) LIKE '%{term}%'")
    }
}
