// crates/parcelscout/src/services/geocode.rs
// REST client for findAddressCandidates-style geocoding endpoints

use super::{GeocodeService, ServiceHttpClient};
use crate::error::{Result, SearchError};
use async_trait::async_trait;
use parcelscout_types::GeoPoint;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Geocoder returning the single best candidate for a free-text address.
pub struct RestGeocoder {
    url: String,
    http: ServiceHttpClient,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<GeocodeErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    address: Option<String>,
    location: CandidateLocation,
}

#[derive(Debug, Deserialize)]
struct CandidateLocation {
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeErrorBody {
    message: Option<String>,
}

impl RestGeocoder {
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

    fn parse_response(body: &str) -> Result<Option<GeoPoint>> {
        let response: GeocodeResponse =
            serde_json::from_str(body).map_err(|e| SearchError::Geocode(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(SearchError::Geocode(
                error.message.unwrap_or_else(|| "unspecified error".into()),
            ));
        }

        // Top candidate only - the endpoint is asked for maxLocations=1
        Ok(response.candidates.into_iter().next().map(|c| GeoPoint {
            x: c.location.x,
            y: c.location.y,
            label: c.address,
        }))
    }
}

#[async_trait]
impl GeocodeService for RestGeocoder {
    #[instrument(skip(self, text), fields(url = %self.url))]
    async fn geocode(&self, text: &str) -> Result<Option<GeoPoint>> {
        let endpoint = format!("{}/findAddressCandidates", self.url);
        let query = [
            ("SingleLine", text.to_string()),
            ("maxLocations", "1".to_string()),
            ("outFields", "*".to_string()),
            ("f", "json".to_string()),
        ];

        let body = self
            .http
            .execute("geocode", |client| client.get(&endpoint).query(&query))
            .await
            .map_err(|e| match e {
                SearchError::Service(msg) => SearchError::Geocode(msg),
                other => other,
            })?;

        let point = Self::parse_response(&body)?;
        debug!(found = point.is_some(), "geocode resolved");
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_top_candidate() {
        let body = r#"{"candidates": [
            {"address": "306 CEDAR LN, RIVERDALE", "location": {"x": -77.12, "y": 38.96}, "score": 98.5},
            {"address": "306 CEDAR CT, RIVERDALE", "location": {"x": -77.20, "y": 38.90}, "score": 80.1}
        ]}"#;
        let point = RestGeocoder::parse_response(body).unwrap().unwrap();
        assert_eq!(point.x, -77.12);
        assert_eq!(point.y, 38.96);
        assert_eq!(point.label.as_deref(), Some("306 CEDAR LN, RIVERDALE"));
    }

    #[test]
    fn test_parse_response_no_candidates() {
        let point = RestGeocoder::parse_response(r#"{"candidates": []}"#).unwrap();
        assert!(point.is_none());
    }

    #[test]
    fn test_parse_response_error_body() {
        let body = r#"{"error": {"message": "Address locator unavailable"}}"#;
        let err = RestGeocoder::parse_response(body).unwrap_err();
        assert!(matches!(err, SearchError::Geocode(_)));
    }

    #[test]
    fn test_parse_response_malformed() {
        assert!(RestGeocoder::parse_response("<html>").is_err());
    }
}
