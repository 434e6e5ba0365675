// crates/parcelscout/src/llm/mod.rs
// AI filter translation: prompt construction, completion client, parsing

mod client;
mod parse;
mod prompt;
mod translate;

pub use client::{CompletionRequest, CompletionService, HttpCompletionClient, COMPLETION_TIMEOUT_SECS};
pub use parse::parse_json_lenient;
pub use prompt::TranslationPrompt;
pub use translate::{translate, TranslatedQuery};
