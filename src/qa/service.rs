//! Query service: validate, optionally ingest, ask the capability, pick the best answer.

use crate::{
    capability::{AnswerCandidate, QaCapability},
    config::Config,
    corpus::{
        CorpusLoader, CorpusSource, CorpusStore, Document, IngestSummary, IngestionError,
        StoreWriteGuard,
    },
    metrics::{MetricsSnapshot, QaMetrics},
    qa::types::{NO_ANSWER, QaError, Query, QueryOutcome, QueryStage},
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TOP_K: usize = 3;

/// Breadth and time limits applied to every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySettings {
    /// Documents considered by retrieval.
    pub top_k_retrieve: usize,
    /// Candidates requested from the reader.
    pub top_k_read: usize,
    /// Optional bound on ingest plus query.
    pub timeout: Option<Duration>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            top_k_retrieve: DEFAULT_TOP_K,
            top_k_read: DEFAULT_TOP_K,
            timeout: None,
        }
    }
}

impl QuerySettings {
    /// Settings taken from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            top_k_retrieve: config.top_k_retrieve,
            top_k_read: config.top_k_read,
            timeout: config.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Handles query requests against a shared corpus store.
///
/// The store, loader, and capability are injected at construction. A request that names a
/// folder holds the store's write guard from ingestion through the capability call, so
/// ingesting requests run one at a time. Requests without a folder only read the store and
/// run concurrently.
pub struct QaService {
    store: Arc<CorpusStore>,
    loader: CorpusLoader,
    capability: Arc<dyn QaCapability>,
    settings: QuerySettings,
    metrics: Arc<QaMetrics>,
}

/// Abstraction over the query pipeline used by the HTTP surface.
#[async_trait]
pub trait QaApi: Send + Sync {
    /// Answer `query`, first ingesting `folder` into the store when one is given.
    async fn answer(&self, query: String, folder: Option<&Path>) -> Result<QueryOutcome, QaError>;

    /// Count a request that was rejected before reaching the pipeline (malformed body).
    fn record_rejected(&self);

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl QaService {
    /// Build a service around injected collaborators.
    pub fn new(
        store: Arc<CorpusStore>,
        loader: CorpusLoader,
        capability: Arc<dyn QaCapability>,
        settings: QuerySettings,
    ) -> Self {
        Self {
            store,
            loader,
            capability,
            settings,
            metrics: Arc::new(QaMetrics::new()),
        }
    }

    /// Shared store backing this service.
    pub fn store(&self) -> &Arc<CorpusStore> {
        &self.store
    }

    /// Ingest `source` outside of any request, as the fixed-corpus variant does at startup.
    pub async fn preload(&self, source: &CorpusSource) -> Result<IngestSummary, IngestionError> {
        let mut guard = self.store.write().await;
        self.ingest(source, &mut guard).await
    }

    /// Run one query request through validation, optional ingestion, and the capability.
    pub async fn answer(
        &self,
        query: String,
        folder: Option<&Path>,
    ) -> Result<QueryOutcome, QaError> {
        tracing::debug!(stage = %QueryStage::Received, "Query request");
        let result = match Query::parse(query) {
            Ok(query) => {
                tracing::debug!(stage = %QueryStage::Validated, "Query request");
                match self.settings.timeout {
                    Some(limit) => tokio::time::timeout(limit, self.run(query, folder))
                        .await
                        .unwrap_or_else(|_| Err(QaError::Timeout(limit))),
                    None => self.run(query, folder).await,
                }
            }
            Err(error) => Err(error),
        };

        match &result {
            Ok(outcome) => {
                self.metrics.record_query(outcome.answered);
                tracing::info!(
                    answered = outcome.answered,
                    candidates = outcome.candidates,
                    "Query answered"
                );
            }
            Err(error) => {
                self.metrics.record_failure();
                tracing::warn!(stage = %QueryStage::Failed, error = %error, "Query failed");
            }
        }
        result
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn run(&self, query: Query, folder: Option<&Path>) -> Result<QueryOutcome, QaError> {
        let candidates = match folder {
            Some(folder) => {
                let mut guard = self.store.write().await;
                self.ingest(&CorpusSource::Folder(folder.to_path_buf()), &mut guard)
                    .await?;
                tracing::debug!(stage = %QueryStage::CorpusLoaded, corpus = guard.len(), "Query request");
                self.ask(guard.documents(), &query).await?
            }
            None => {
                let guard = self.store.read().await;
                self.ask(guard.documents(), &query).await?
            }
        };
        tracing::debug!(stage = %QueryStage::Queried, candidates = candidates.len(), "Query request");

        let outcome = select_answer(query, &candidates);
        tracing::debug!(stage = %QueryStage::Responded, "Query request");
        Ok(outcome)
    }

    async fn ask(
        &self,
        corpus: &[Document],
        query: &Query,
    ) -> Result<Vec<AnswerCandidate>, QaError> {
        let candidates = self
            .capability
            .query(
                corpus,
                query.text(),
                self.settings.top_k_retrieve,
                self.settings.top_k_read,
            )
            .await?;
        Ok(candidates)
    }

    async fn ingest(
        &self,
        source: &CorpusSource,
        guard: &mut StoreWriteGuard<'_>,
    ) -> Result<IngestSummary, IngestionError> {
        let summary = self.loader.ingest(source, guard).await?;
        self.metrics.record_ingest(summary.documents as u64);
        self.metrics.record_corpus_size(guard.len() as u64);
        Ok(summary)
    }
}

/// Pick the best candidate, falling back to [`NO_ANSWER`] when there is none.
pub(crate) fn select_answer(query: Query, candidates: &[AnswerCandidate]) -> QueryOutcome {
    let best = candidates.first().map(|candidate| candidate.text.clone());
    QueryOutcome {
        query: query.into_text(),
        answered: best.is_some(),
        response: best.unwrap_or_else(|| NO_ANSWER.to_string()),
        candidates: candidates.len(),
    }
}

#[async_trait]
impl QaApi for QaService {
    async fn answer(&self, query: String, folder: Option<&Path>) -> Result<QueryOutcome, QaError> {
        QaService::answer(self, query, folder).await
    }

    fn record_rejected(&self) {
        self.metrics.record_failure();
        tracing::warn!(stage = %QueryStage::Failed, "Query request rejected");
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        QaService::metrics_snapshot(self)
    }
}
