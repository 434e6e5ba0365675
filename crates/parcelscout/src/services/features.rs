// crates/parcelscout/src/services/features.rs
// REST client for ArcGIS-style feature layer query endpoints

use super::{FeatureQuery, FeatureQueryService, ServiceHttpClient};
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use parcelscout_types::{FeatureRecord, Geometry};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Feature layer client speaking the `…/query` REST convention:
/// `where`, `orderByFields`, `resultRecordCount`, point geometry with
/// `spatialRel=esriSpatialRelIntersects`, `f=json`.
///
/// Used for both the primary parcel layer and the address-point index
/// (two instances with different endpoints).
pub struct RestFeatureService {
    url: String,
    http: ServiceHttpClient,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<RawFeature>,
    error: Option<ServiceErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
}

impl RestFeatureService {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into().trim_end_matches('/').to_string();
        Self {
            url,
            http: ServiceHttpClient::new(
                Duration::from_secs(REQUEST_TIMEOUT_SECS),
                Duration::from_secs(CONNECT_TIMEOUT_SECS),
            ),
        }
    }

    fn build_params(request: &FeatureQuery) -> Result<Vec<(&'static str, String)>> {
        if request.where_clause.is_none() && request.geometry.is_none() {
            return Err(SearchError::InvalidInput(
                "feature query requires a filter or a geometry".into(),
            ));
        }

        let mut params: Vec<(&'static str, String)> = vec![
            ("f", "json".into()),
            ("outFields", "*".into()),
            ("returnGeometry", "true".into()),
        ];

        if let Some(ref where_clause) = request.where_clause {
            params.push(("where", where_clause.clone()));
        }
        if let Some(ref point) = request.geometry {
            params.push((
                "geometry",
                format!("{{\"x\":{},\"y\":{}}}", point.x, point.y),
            ));
            params.push(("geometryType", "esriGeometryPoint".into()));
            params.push(("spatialRel", "esriSpatialRelIntersects".into()));
            params.push(("inSR", "4326".into()));
        }
        if let Some(ref order_by) = request.order_by {
            params.push(("orderByFields", order_by.clone()));
        }
        if let Some(limit) = request.limit {
            params.push(("resultRecordCount", limit.to_string()));
        }

        Ok(params)
    }

    fn parse_response(body: &str) -> Result<Vec<FeatureRecord>> {
        let response: QueryResponse = serde_json::from_str(body)?;

        if let Some(error) = response.error {
            return Err(SearchError::Service(
                error.message.unwrap_or_else(|| "unspecified error".into()),
            ));
        }

        Ok(response
            .features
            .into_iter()
            .map(|f| FeatureRecord {
                attributes: f.attributes,
                geometry: f.geometry,
            })
            .collect())
    }
}

#[async_trait]
impl FeatureQueryService for RestFeatureService {
    #[instrument(skip(self, request), fields(url = %self.url))]
    async fn query(&self, request: &FeatureQuery) -> Result<Vec<FeatureRecord>> {
        let params = Self::build_params(request)?;
        let endpoint = format!("{}/query", self.url);

        let body = self
            .http
            .execute("feature-query", |client| {
                client.post(&endpoint).form(&params)
            })
            .await?;

        let features = Self::parse_response(&body)?;
        debug!(count = features.len(), "feature query resolved");
        Ok(features)
    }
}
