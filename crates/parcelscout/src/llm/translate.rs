// crates/parcelscout/src/llm/translate.rs
// Freeform text -> structured filter via the completion service

use super::client::{CompletionRequest, CompletionService, COMPLETION_TIMEOUT_SECS};
use super::parse::parse_json_lenient;
use super::prompt::TranslationPrompt;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use parcelscout_types::StructuredFilter;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// The structured result a translation call may produce. All keys are
/// optional; an object with none of the actionable keys is treated the
/// same as a parse miss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatedQuery {
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default, rename = "orderBy", alias = "order_by")]
    pub order_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub limit: Option<u32>,
    #[serde(default, rename = "parcelId", alias = "parcel_id")]
    pub parcel_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub interpretation: Option<String>,
}

impl TranslatedQuery {
    /// Anything the orchestrator can dispatch on
    pub fn is_actionable(&self) -> bool {
        self.parcel_id.is_some() || self.address.is_some() || self.where_clause.is_some()
    }

    /// The filter form of this result, when a `where` key was produced.
    pub fn filter(&self) -> Option<StructuredFilter> {
        self.where_clause.as_ref().map(|w| StructuredFilter {
            where_clause: w.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
        })
    }
}

/// Models sometimes return `"limit": "10"`; accept both forms.
fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u32),
        String(String),
    }

    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Translate a freeform query into a structured result.
///
/// Returns `None` for every non-actionable case: unconfigured system
/// instruction, completion failure after the fallback-model retry, or
/// unparseable output. The caller proceeds to fallback text search -
/// translation failure is never surfaced to the user.
pub async fn translate(
    completion: &dyn CompletionService,
    config: &SearchConfig,
    session_summary: &str,
    text: &str,
) -> Option<TranslatedQuery> {
    let system_instruction = config.system_prompt.as_deref()?.trim();
    if system_instruction.is_empty() {
        debug!("no system instruction configured, skipping translation");
        return None;
    }

    let prompt =
        TranslationPrompt::new(system_instruction, &config.fields, session_summary, text).build();

    let request = CompletionRequest {
        model: config.model.clone(),
        prompt,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let raw = match complete_bounded(completion, &request).await {
        Ok(content) => content,
        Err(e) => {
            warn!(model = %request.model, error = %e, "primary model failed, retrying on fallback");
            let retry = CompletionRequest {
                model: config.fallback_model.clone(),
                ..request
            };
            match complete_bounded(completion, &retry).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(model = %retry.model, error = %e, "fallback model failed, degrading");
                    return None;
                }
            }
        }
    };

    let translated = parse_json_lenient::<TranslatedQuery>(&raw)?;
    if let Some(ref interpretation) = translated.interpretation {
        debug!(interpretation = %interpretation, "translation interpreted query");
    }
    Some(translated)
}

/// One completion call under the hard 30-second budget, regardless of
/// the underlying implementation's own timeout handling.
async fn complete_bounded(
    completion: &dyn CompletionService,
    request: &CompletionRequest,
) -> Result<String> {
    match tokio::time::timeout(
        Duration::from_secs(COMPLETION_TIMEOUT_SECS),
        completion.complete(request),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(SearchError::Completion("completion call timed out".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_all_keys() {
        let parsed: TranslatedQuery = serde_json::from_str(
            r#"{
                "where": "SALEAMOUNT > 500000",
                "orderBy": "SALEAMOUNT DESC",
                "limit": 10,
                "interpretation": "ten largest sales"
            }"#,
        )
        .unwrap();
        assert_eq!(parsed.where_clause.as_deref(), Some("SALEAMOUNT > 500000"));
        assert_eq!(parsed.order_by.as_deref(), Some("SALEAMOUNT DESC"));
        assert_eq!(parsed.limit, Some(10));
        assert!(parsed.is_actionable());
    }

    #[test]
    fn test_deserialize_string_limit() {
        let parsed: TranslatedQuery =
            serde_json::from_str(r#"{"where": "x > 1", "limit": "25"}"#).unwrap();
        assert_eq!(parsed.limit, Some(25));
    }

    #[test]
    fn test_deserialize_parcel_and_address_keys() {
        let parsed: TranslatedQuery =
            serde_json::from_str(r#"{"parcelId": "123-456-789"}"#).unwrap();
        assert_eq!(parsed.parcel_id.as_deref(), Some("123-456-789"));

        let parsed: TranslatedQuery =
            serde_json::from_str(r#"{"address": "306 Cedar Lane"}"#).unwrap();
        assert_eq!(parsed.address.as_deref(), Some("306 Cedar Lane"));
    }

    #[test]
    fn test_empty_object_is_not_actionable() {
        let parsed: TranslatedQuery = serde_json::from_str("{}").unwrap();
        assert!(!parsed.is_actionable());
        assert!(parsed.filter().is_none());
    }

    #[test]
    fn test_filter_carries_order_and_limit() {
        let parsed: TranslatedQuery = serde_json::from_str(
            r#"{"where": "YEARBUILT < 1950", "orderBy": "YEARBUILT", "limit": 5}"#,
        )
        .unwrap();
        let filter = parsed.filter().unwrap();
        assert_eq!(filter.where_clause, "YEARBUILT < 1950");
        assert_eq!(filter.order_by.as_deref(), Some("YEARBUILT"));
        assert_eq!(filter.limit, Some(5));
    }
}
