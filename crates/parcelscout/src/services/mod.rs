// crates/parcelscout/src/services/mod.rs
// External service collaborators (feature layers, geocoding)

mod features;
mod geocode;
mod http_client;

pub use features::RestFeatureService;
pub use geocode::RestGeocoder;
pub use http_client::ServiceHttpClient;

use crate::error::Result;
use async_trait::async_trait;
use parcelscout_types::{FeatureRecord, GeoPoint, StructuredFilter};

/// One query against a feature layer: a predicate, a point for spatial
/// intersection, or both, plus optional ordering and a result cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureQuery {
    pub where_clause: Option<String>,
    /// Exact point intersection - no buffering or tolerance expansion
    pub geometry: Option<GeoPoint>,
    pub order_by: Option<String>,
    pub limit: Option<u32>,
}

impl FeatureQuery {
    pub fn with_where(where_clause: impl Into<String>) -> Self {
        Self {
            where_clause: Some(where_clause.into()),
            ..Default::default()
        }
    }

    /// Carry a validated filter unmodified - no silent field substitution.
    pub fn with_filter(filter: &StructuredFilter) -> Self {
        Self {
            where_clause: Some(filter.where_clause.clone()),
            geometry: None,
            order_by: filter.order_by.clone(),
            limit: filter.limit,
        }
    }

    /// Single-feature spatial intersection at the given point.
    pub fn intersecting(point: GeoPoint) -> Self {
        Self {
            where_clause: None,
            geometry: Some(point),
            order_by: None,
            limit: Some(1),
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Feature query service: filter predicate + optional geometry in,
/// feature records out.
#[async_trait]
pub trait FeatureQueryService: Send + Sync {
    async fn query(&self, request: &FeatureQuery) -> Result<Vec<FeatureRecord>>;
}

/// Geocoding service: free-text address in, zero or one best candidate out.
#[async_trait]
pub trait GeocodeService: Send + Sync {
    async fn geocode(&self, text: &str) -> Result<Option<GeoPoint>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_filter_carries_clause_unmodified() {
        let filter = StructuredFilter {
            where_clause: "SALEAMOUNT > 500000".into(),
            order_by: Some("SALEAMOUNT DESC".into()),
            limit: Some(10),
        };
        let query = FeatureQuery::with_filter(&filter);
        assert_eq!(query.where_clause.as_deref(), Some("SALEAMOUNT > 500000"));
        assert_eq!(query.order_by.as_deref(), Some("SALEAMOUNT DESC"));
        assert_eq!(query.limit, Some(10));
        assert!(query.geometry.is_none());
    }

    #[test]
    fn test_intersecting_caps_at_one() {
        let query = FeatureQuery::intersecting(GeoPoint::new(-77.1, 38.9));
        assert_eq!(query.limit, Some(1));
        assert!(query.where_clause.is_none());
        assert!(query.geometry.is_some());
    }
}
