// crates/parcelscout/src/session.rs
// Rolling session memory used to disambiguate follow-up queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Most recent entries kept per session; the oldest is evicted on overflow
pub const SESSION_MEMORY_CAP: usize = 10;

/// One completed resolution, as remembered for prompt construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub query: String,
    pub result_count: usize,
    pub filter_used: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered log of past resolutions for the current session.
///
/// Append is the only mutation; the orchestrator records one entry after
/// each resolution normalizes.
#[derive(Debug, Default)]
pub struct SessionMemory {
    entries: VecDeque<SessionEntry>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        query: impl Into<String>,
        result_count: usize,
        filter_used: Option<String>,
    ) {
        self.entries.push_back(SessionEntry {
            query: query.into(),
            result_count,
            filter_used,
            timestamp: Utc::now(),
        });
        while self.entries.len() > SESSION_MEMORY_CAP {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &SessionEntry> {
        self.entries.iter()
    }

    pub fn snapshot(&self) -> Vec<SessionEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Plain-text rendering, oldest first, for the translation prompt.
    /// Empty memory renders as an empty string.
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|e| {
                let filter = e
                    .filter_used
                    .as_deref()
                    .map(|f| format!(" (filter: {f})"))
                    .unwrap_or_default();
                format!("\"{}\" -> {} result(s){}", e.query, e.result_count, filter)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
