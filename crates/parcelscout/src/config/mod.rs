// crates/parcelscout/src/config/mod.rs
// Pipeline configuration, supplied by the host application

pub mod env;

pub use env::ApiKeys;

use parcelscout_types::FieldDef;

/// Resolved configuration for one search pipeline.
///
/// Field names, the AI system prompt, and model choices come from the host's
/// map configuration; the pipeline treats them as already-resolved input.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Field holding the parcel/account identifier on the primary layer
    pub identifier_field: String,
    /// Field used for substring address matching on the primary layer
    pub address_field: String,
    /// Field used to match against the address-point index
    pub address_index_field: String,
    /// Exact match (`=`) against the address index instead of substring
    pub address_index_exact: bool,
    /// System instruction for AI filter translation. Unset disables translation.
    pub system_prompt: Option<String>,
    /// Primary completion model
    pub model: String,
    /// Fallback model, tried exactly once when the primary fails
    pub fallback_model: String,
    /// Sampling temperature for translation calls
    pub temperature: f32,
    /// Output cap for translation calls
    pub max_tokens: u32,
    /// Queryable-field catalogue exposed to the translation prompt
    pub fields: Vec<FieldDef>,
}

impl SearchConfig {
    pub fn new(identifier_field: impl Into<String>, address_field: impl Into<String>) -> Self {
        let address_field = address_field.into();
        Self {
            identifier_field: identifier_field.into(),
            address_index_field: address_field.clone(),
            address_field,
            address_index_exact: false,
            system_prompt: None,
            model: "gpt-5-mini".to_string(),
            fallback_model: "gpt-4.1-mini".to_string(),
            temperature: 0.1,
            max_tokens: 800,
            fields: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldDef>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_models(
        mut self,
        model: impl Into<String>,
        fallback_model: impl Into<String>,
    ) -> Self {
        self.model = model.into();
        self.fallback_model = fallback_model.into();
        self
    }

    pub fn with_address_index(mut self, field: impl Into<String>, exact: bool) -> Self {
        self.address_index_field = field.into();
        self.address_index_exact = exact;
        self
    }

    /// Translation is only attempted with a non-empty system instruction.
    pub fn translation_enabled(&self) -> bool {
        self.system_prompt
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parcelscout_types::FieldType;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::new("PARCELID", "SITEADDRESS");
        assert_eq!(config.identifier_field, "PARCELID");
        assert_eq!(config.address_field, "SITEADDRESS");
        assert_eq!(config.address_index_field, "SITEADDRESS");
        assert!(!config.address_index_exact);
        assert!(!config.translation_enabled());
        assert!(config.fields.is_empty());
    }

    #[test]
    fn test_translation_enabled_requires_nonempty_prompt() {
        let config = SearchConfig::new("PARCELID", "SITEADDRESS").with_system_prompt("   ");
        assert!(!config.translation_enabled());

        let config = SearchConfig::new("PARCELID", "SITEADDRESS")
            .with_system_prompt("Translate property searches.");
        assert!(config.translation_enabled());
    }

    #[test]
    fn test_builders() {
        let config = SearchConfig::new("PARCELID", "SITEADDRESS")
            .with_address_index("FULLADDR", true)
            .with_models("primary-model", "backup-model")
            .with_fields(vec![FieldDef::new("SALEAMOUNT", FieldType::Number)]);
        assert_eq!(config.address_index_field, "FULLADDR");
        assert!(config.address_index_exact);
        assert_eq!(config.model, "primary-model");
        assert_eq!(config.fallback_model, "backup-model");
        assert_eq!(config.fields.len(), 1);
    }
}
