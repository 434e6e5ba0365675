// crates/parcelscout/src/orchestrator/mod.rs
// Top-level coordinator: classification -> strategy -> fallback -> normalization

mod state;

pub use state::{transition, PipelineEvent, PipelineState};

use crate::classify::classify;
use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::filter::is_unrestricted;
use crate::llm::{translate, CompletionService};
use crate::resolve::{
    fallback_search, identifier_lookup, resolve_address, RequestContext,
};
use crate::services::{FeatureQuery, FeatureQueryService, GeocodeService};
use crate::session::{SessionEntry, SessionMemory};
use async_trait::async_trait;
use parcelscout_types::{FeatureRecord, QueryClassification, ResolutionOutcome};
use state::apply;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Map/UI collaborator boundary. The pipeline only ever asks for one
/// side effect: center on and highlight a single matched record.
#[async_trait]
pub trait MapActions: Send + Sync {
    async fn center_and_highlight(&self, record: &FeatureRecord);
}

/// For hosts without a map surface.
pub struct NoopMap;

#[async_trait]
impl MapActions for NoopMap {
    async fn center_and_highlight(&self, _record: &FeatureRecord) {}
}

/// What a completed resolution carries into normalization.
struct Resolution {
    records: Vec<FeatureRecord>,
    filter_used: Option<String>,
}

#[derive(Default)]
struct SessionState {
    memory: SessionMemory,
    sequence: u64,
}

/// Sequences classification, strategy selection, execution,
/// fallback-on-empty, and result normalization for one session.
///
/// Single-flight: submissions are serialized behind one lock, so session
/// memory entries land in submission order and never interleave.
pub struct QueryOrchestrator {
    config: SearchConfig,
    features: Arc<dyn FeatureQueryService>,
    address_index: Option<Arc<dyn FeatureQueryService>>,
    geocoder: Option<Arc<dyn GeocodeService>>,
    completion: Option<Arc<dyn CompletionService>>,
    map: Arc<dyn MapActions>,
    inner: Mutex<SessionState>,
}

impl QueryOrchestrator {
    pub fn new(config: SearchConfig, features: Arc<dyn FeatureQueryService>) -> Self {
        Self {
            config,
            features,
            address_index: None,
            geocoder: None,
            completion: None,
            map: Arc::new(NoopMap),
            inner: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_address_index(mut self, index: Arc<dyn FeatureQueryService>) -> Self {
        self.address_index = Some(index);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn GeocodeService>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_completion(mut self, completion: Arc<dyn CompletionService>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn with_map(mut self, map: Arc<dyn MapActions>) -> Self {
        self.map = map;
        self
    }

    /// Current session memory, oldest first.
    pub async fn session_snapshot(&self) -> Vec<SessionEntry> {
        self.inner.lock().await.memory.snapshot()
    }

    /// Resolve one raw query to a terminal outcome.
    ///
    /// Never panics and never returns Err - every failure path collapses
    /// into `ResolutionOutcome::Failure` with a single plain-language
    /// message.
    #[instrument(skip(self, text), fields(query = %text))]
    pub async fn submit(&self, text: &str) -> ResolutionOutcome {
        let mut session = self.inner.lock().await;
        session.sequence += 1;

        let ctx = RequestContext {
            config: &self.config,
            session_summary: session.memory.summary(),
            sequence: session.sequence,
        };

        let mut state = apply(PipelineState::Idle, PipelineEvent::Submitted);
        let classification = classify(text);
        debug!(?classification, sequence = ctx.sequence, "query classified");
        state = apply(state, PipelineEvent::Classified);

        match self.resolve(&ctx, &mut state, text, classification).await {
            Ok(resolution) => {
                let count = resolution.records.len();
                let outcome = self.normalize(resolution.records).await;
                let _ = apply(state, PipelineEvent::Surfaced);
                session.memory.record(text, count, resolution.filter_used);
                outcome
            }
            Err(e) => {
                warn!(error = %e, "resolution failed");
                if state != PipelineState::Failed {
                    state = apply(state, PipelineEvent::StrategyFailed);
                }
                let _ = apply(state, PipelineEvent::Surfaced);
                ResolutionOutcome::Failure {
                    reason: e.to_user_string(),
                }
            }
        }
    }

    async fn resolve(
        &self,
        ctx: &RequestContext<'_>,
        state: &mut PipelineState,
        text: &str,
        classification: QueryClassification,
    ) -> Result<Resolution> {
        match classification {
            QueryClassification::Identifier => {
                // Deterministic lookup; zero results terminate as NoMatch
                // with no fallback
                *state = apply(*state, PipelineEvent::QueryIssued);
                let (records, filter) =
                    identifier_lookup(self.features.as_ref(), ctx, text).await?;
                *state = apply(*state, PipelineEvent::Resolved);
                Ok(Resolution {
                    records,
                    filter_used: Some(filter),
                })
            }
            QueryClassification::Address => {
                *state = apply(*state, PipelineEvent::QueryIssued);
                let resolution = resolve_address(
                    self.features.as_ref(),
                    self.address_index.as_deref(),
                    self.geocoder.as_deref(),
                    ctx,
                    text,
                )
                .await?;

                if resolution.point.is_some() && !resolution.features.is_empty() {
                    *state = apply(*state, PipelineEvent::Resolved);
                    Ok(Resolution {
                        records: resolution.features,
                        filter_used: None,
                    })
                } else {
                    // No coordinate, or the intersection came back empty
                    self.fallback_once(ctx, state, text).await
                }
            }
            QueryClassification::Freeform => self.resolve_freeform(ctx, state, text).await,
        }
    }

    async fn resolve_freeform(
        &self,
        ctx: &RequestContext<'_>,
        state: &mut PipelineState,
        text: &str,
    ) -> Result<Resolution> {
        let translated = match self.completion {
            Some(ref completion) => {
                translate(completion.as_ref(), &self.config, &ctx.session_summary, text).await
            }
            None => None,
        };

        let Some(translated) = translated.filter(|t| t.is_actionable()) else {
            // Parse miss, unconfigured prompt, or nothing actionable
            *state = apply(*state, PipelineEvent::QueryIssued);
            return self.fallback_terminal(ctx, state, text).await;
        };

        if let Some(ref parcel_id) = translated.parcel_id {
            *state = apply(*state, PipelineEvent::QueryIssued);
            let (records, filter) =
                identifier_lookup(self.features.as_ref(), ctx, parcel_id).await?;
            if records.is_empty() {
                return self.fallback_once(ctx, state, text).await;
            }
            *state = apply(*state, PipelineEvent::Resolved);
            return Ok(Resolution {
                records,
                filter_used: Some(filter),
            });
        }

        if let Some(ref address) = translated.address {
            *state = apply(*state, PipelineEvent::QueryIssued);
            let resolution = resolve_address(
                self.features.as_ref(),
                self.address_index.as_deref(),
                self.geocoder.as_deref(),
                ctx,
                address,
            )
            .await?;
            if resolution.features.is_empty() {
                return self.fallback_once(ctx, state, text).await;
            }
            *state = apply(*state, PipelineEvent::Resolved);
            return Ok(Resolution {
                records: resolution.features,
                filter_used: None,
            });
        }

        // `where` is the only remaining actionable key
        let Some(filter) = translated.filter() else {
            *state = apply(*state, PipelineEvent::QueryIssued);
            return self.fallback_terminal(ctx, state, text).await;
        };

        *state = apply(*state, PipelineEvent::FilterProduced);
        if is_unrestricted(&filter.where_clause) {
            *state = apply(*state, PipelineEvent::FilterRejected);
            return Err(SearchError::UnrestrictedFilter);
        }
        *state = apply(*state, PipelineEvent::FilterApproved);

        // Validated filter passes through unmodified
        let request = FeatureQuery::with_filter(&filter);
        let records = self.features.query(&request).await?;
        if records.is_empty() {
            return self.fallback_once(ctx, state, text).await;
        }
        *state = apply(*state, PipelineEvent::Resolved);
        Ok(Resolution {
            records,
            filter_used: Some(filter.where_clause),
        })
    }

    /// The single loop-back: Querying -> Resolving -> fallback search.
    /// Whatever it returns is normalized; there is no second attempt.
    async fn fallback_once(
        &self,
        ctx: &RequestContext<'_>,
        state: &mut PipelineState,
        term: &str,
    ) -> Result<Resolution> {
        *state = apply(*state, PipelineEvent::EmptyResult);
        *state = apply(*state, PipelineEvent::QueryIssued);
        self.fallback_terminal(ctx, state, term).await
    }

    async fn fallback_terminal(
        &self,
        ctx: &RequestContext<'_>,
        state: &mut PipelineState,
        term: &str,
    ) -> Result<Resolution> {
        let (records, filter) = fallback_search(self.features.as_ref(), ctx, term).await?;
        *state = apply(*state, PipelineEvent::Resolved);
        Ok(Resolution {
            records,
            filter_used: Some(filter),
        })
    }

    async fn normalize(&self, mut records: Vec<FeatureRecord>) -> ResolutionOutcome {
        match records.len() {
            0 => ResolutionOutcome::NoMatch,
            1 => {
                let record = records.remove(0);
                self.map.center_and_highlight(&record).await;
                ResolutionOutcome::SingleMatch { record }
            }
            _ => ResolutionOutcome::MultiMatch { records },
        }
    }
}
