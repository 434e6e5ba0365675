// crates/parcelscout/src/config/env.rs
// Environment-based credentials - single source of truth for env vars

use tracing::{debug, warn};

/// API keys loaded from environment variables
///
/// Set `PARCELSCOUT_DISABLE_LLM=1` to suppress the completion key
/// (forces the heuristic fallback path for every freeform query).
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// Completion service key (PARCELSCOUT_API_KEY, falls back to OPENAI_API_KEY)
    pub completion: Option<String>,
}

impl ApiKeys {
    /// Load API keys from environment variables (single source of truth)
    pub fn from_env() -> Self {
        if read_bool("PARCELSCOUT_DISABLE_LLM") {
            debug!("PARCELSCOUT_DISABLE_LLM is set - completion service disabled");
            return Self { completion: None };
        }

        let completion =
            read_key("PARCELSCOUT_API_KEY").or_else(|| read_key("OPENAI_API_KEY"));

        let keys = Self { completion };
        keys.log_status();
        keys
    }

    /// Whether AI filter translation can be wired up at all
    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Log availability without exposing values
    fn log_status(&self) {
        if self.completion.is_some() {
            debug!("completion API key loaded");
        } else {
            warn!("no completion API key configured - freeform queries will use fallback search");
        }
    }
}

/// Read a single key from the environment, filtering empty values
fn read_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|k| !k.trim().is_empty())
}

fn read_bool(name: &str) -> bool {
    matches!(
        std::env::var(name).ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_key_missing_var() {
        assert_eq!(read_key("PARCELSCOUT_TEST_KEY_DOES_NOT_EXIST"), None);
    }

    #[test]
    fn test_read_bool_missing_var() {
        assert!(!read_bool("PARCELSCOUT_TEST_FLAG_DOES_NOT_EXIST"));
    }

    #[test]
    fn test_has_completion() {
        let keys = ApiKeys {
            completion: Some("sk-test".into()),
        };
        assert!(keys.has_completion());
        assert!(!ApiKeys::default().has_completion());
    }
}
