// crates/parcelscout/src/error.rs
// Standardized error types for ParcelScout

use thiserror::Error;

/// Main error type for the ParcelScout library
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("search is too broad; add more criteria")]
    UnrestrictedFilter,

    #[error("feature service error: {0}")]
    Service(String),

    #[error("geocoding error: {0}")]
    Geocode(String),

    #[error("completion error: {0}")]
    Completion(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown error: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using SearchError
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Convert to the single plain-language message shown to the user.
    ///
    /// Validator rejections keep their actionable wording; every
    /// service-side failure collapses to one generic message.
    pub fn to_user_string(&self) -> String {
        match self {
            SearchError::UnrestrictedFilter | SearchError::InvalidInput(_) => self.to_string(),
            SearchError::Service(_)
            | SearchError::Geocode(_)
            | SearchError::Completion(_)
            | SearchError::Http(_) => "search failed, try rephrasing".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<String> for SearchError {
    fn from(s: String) -> Self {
        SearchError::Other(s)
    }
}
