// crates/parcelscout/src/llm/client.rs
// Text completion client (OpenAI-compatible chat endpoint)

use crate::error::{Result, SearchError};
use crate::services::ServiceHttpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Hard cap on any single completion call. After this the pipeline
/// proceeds through the fallback chain rather than hanging.
pub const COMPLETION_TIMEOUT_SECS: u64 = 30;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// One completion call: a fully-assembled prompt plus generation parameters.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text completion service - returns generated text expected to contain
/// one JSON object. Model is chosen per request so the translation layer
/// can retry once on a fallback model.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// OpenAI-compatible chat completions client with Bearer auth.
pub struct HttpCompletionClient {
    api_key: String,
    url: String,
    http: ServiceHttpClient,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    error: Option<ChatErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorBody {
    message: Option<String>,
}

impl HttpCompletionClient {
    pub fn new(api_key: String) -> Self {
        Self::with_url(api_key, DEFAULT_COMPLETION_URL)
    }

    pub fn with_url(api_key: String, url: impl Into<String>) -> Self {
        Self {
            api_key,
            url: url.into(),
            http: ServiceHttpClient::new(
                Duration::from_secs(COMPLETION_TIMEOUT_SECS),
                Duration::from_secs(CONNECT_TIMEOUT_SECS),
            ),
        }
    }

    fn parse_response(body: &str) -> Result<String> {
        let response: ChatResponse =
            serde_json::from_str(body).map_err(|e| SearchError::Completion(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(SearchError::Completion(
                error.message.unwrap_or_else(|| "unspecified error".into()),
            ));
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SearchError::Completion("empty response".into()))
    }
}

#[async_trait]
impl CompletionService for HttpCompletionClient {
    #[instrument(skip(self, request), fields(request_id, model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let body = json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        })
        .to_string();

        let response_body = self
            .http
            .execute(&request_id, |client| {
                client
                    .post(&self.url)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .header("Content-Type", "application/json")
                    .body(body.clone())
            })
            .await
            .map_err(|e| match e {
                SearchError::Service(msg) => SearchError::Completion(msg),
                SearchError::Http(e) => SearchError::Completion(e.to_string()),
                other => other,
            })?;

        let content = Self::parse_response(&response_body)?;
        debug!(request_id = %request_id, chars = content.len(), "completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "{\"where\": \"SALEAMOUNT > 500000\"}"}}]}"#;
        let content = HttpCompletionClient::parse_response(body).unwrap();
        assert!(content.contains("SALEAMOUNT"));
    }

    #[test]
    fn test_parse_response_service_error() {
        let body = r#"{"error": {"message": "model overloaded"}}"#;
        let err = HttpCompletionClient::parse_response(body).unwrap_err();
        assert!(matches!(err, SearchError::Completion(_)));
        assert!(err.to_string().contains("model overloaded"));
    }

    #[test]
    fn test_parse_response_empty_choices() {
        let err = HttpCompletionClient::parse_response(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, SearchError::Completion(_)));
    }

    #[test]
    fn test_timeout_constant() {
        assert_eq!(COMPLETION_TIMEOUT_SECS, 30);
    }
}
