// crates/parcelscout/src/services/http_client.rs
// Shared HTTP client configuration for all REST collaborators

use crate::error::{Result, SearchError};
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

/// Default base backoff between retry attempts (doubles each attempt)
const DEFAULT_BASE_BACKOFF_SECS: u64 = 1;

/// Shared HTTP client with per-service timeouts and optional bounded
/// retry for transient failures.
///
/// Pipeline clients default to zero retries: a feature-service or
/// geocoder failure is terminal for the query, and the completion
/// service has its own fallback-model contract one layer up.
pub struct ServiceHttpClient {
    client: Client,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl ServiceHttpClient {
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            request_timeout,
            connect_timeout,
            max_attempts: 0,
            base_backoff: Duration::from_secs(DEFAULT_BASE_BACKOFF_SECS),
        }
    }

    /// Allow up to `attempts` retries of transient failures (429/5xx,
    /// connect/timeout errors).
    pub fn with_retries(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Execute a request, retrying transient failures up to `max_attempts`
    /// times. The `build_request` closure is called on each attempt.
    /// Returns the response body as text on success.
    pub async fn execute<F>(&self, request_id: &str, build_request: F) -> Result<String>
    where
        F: Fn(&Client) -> reqwest::RequestBuilder,
    {
        let mut attempts = 0;
        let mut backoff = self.base_backoff;

        loop {
            match build_request(&self.client).send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        let error_body = response.text().await.unwrap_or_default();

                        if attempts < self.max_attempts
                            && (status.as_u16() == 429 || status.is_server_error())
                        {
                            warn!(
                                request_id = %request_id,
                                status = %status,
                                "transient error, retrying in {:?}",
                                backoff
                            );
                            tokio::time::sleep(backoff).await;
                            attempts += 1;
                            backoff *= 2;
                            continue;
                        }

                        return Err(SearchError::Service(format!(
                            "API error {status}: {error_body}"
                        )));
                    }

                    return Ok(response.text().await?);
                }
                Err(e) => {
                    // Only connect/timeout errors are safe to retry;
                    // anything else may already have been processed
                    if attempts < self.max_attempts && (e.is_connect() || e.is_timeout()) {
                        warn!(
                            request_id = %request_id,
                            error = %e,
                            "request failed (connect/timeout), retrying in {:?}",
                            backoff
                        );
                        tokio::time::sleep(backoff).await;
                        attempts += 1;
                        backoff *= 2;
                        continue;
                    }
                    return Err(SearchError::Http(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ServiceHttpClient::new(Duration::from_secs(10), Duration::from_secs(5));
        assert_eq!(client.max_attempts, 0);
        assert_eq!(
            client.base_backoff,
            Duration::from_secs(DEFAULT_BASE_BACKOFF_SECS)
        );
        assert_eq!(client.request_timeout, Duration::from_secs(10));
        assert_eq!(client.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_with_retries() {
        let client =
            ServiceHttpClient::new(Duration::from_secs(10), Duration::from_secs(5)).with_retries(2);
        assert_eq!(client.max_attempts, 2);
    }

    #[tokio::test]
    async fn test_execute_connection_refused() {
        let client =
            ServiceHttpClient::new(Duration::from_millis(500), Duration::from_millis(200));
        let result = client
            .execute("test", |c| c.get("http://127.0.0.1:1/query"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_execute_retries_then_fails() {
        let mut client =
            ServiceHttpClient::new(Duration::from_millis(500), Duration::from_millis(200))
                .with_retries(1);
        client.base_backoff = Duration::from_millis(10);
        let result = client
            .execute("test", |c| c.get("http://127.0.0.1:1/query"))
            .await;
        assert!(result.is_err());
    }
}
