use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing query activity.
#[derive(Default)]
pub struct QaMetrics {
    queries_answered: AtomicU64,
    queries_unanswered: AtomicU64,
    queries_failed: AtomicU64,
    documents_ingested: AtomicU64,
    corpus_documents: AtomicU64,
}

impl QaMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a query that produced an answer (`true`) or the "no answer" sentinel (`false`).
    pub fn record_query(&self, answered: bool) {
        let counter = if answered {
            &self.queries_answered
        } else {
            &self.queries_unanswered
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a query that ended in an error response.
    pub fn record_failure(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record documents written into the corpus store.
    pub fn record_ingest(&self, documents: u64) {
        self.documents_ingested
            .fetch_add(documents, Ordering::Relaxed);
    }

    /// Record the store size observed after an ingestion.
    pub fn record_corpus_size(&self, documents: u64) {
        self.corpus_documents.store(documents, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_answered: self.queries_answered.load(Ordering::Relaxed),
            queries_unanswered: self.queries_unanswered.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
            documents_ingested: self.documents_ingested.load(Ordering::Relaxed),
            corpus_documents: self.corpus_documents.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of query counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Queries answered with a candidate since startup.
    pub queries_answered: u64,
    /// Queries that returned the "no answer" sentinel.
    pub queries_unanswered: u64,
    /// Queries that ended in an error response.
    pub queries_failed: u64,
    /// Documents written into the store since startup, duplicates included.
    pub documents_ingested: u64,
    /// Documents currently held by the store.
    pub corpus_documents: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_queries_and_ingestion() {
        let metrics = QaMetrics::new();
        metrics.record_query(true);
        metrics.record_query(false);
        metrics.record_query(true);
        metrics.record_failure();
        metrics.record_ingest(4);
        metrics.record_corpus_size(4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.queries_answered, 2);
        assert_eq!(snapshot.queries_unanswered, 1);
        assert_eq!(snapshot.queries_failed, 1);
        assert_eq!(snapshot.documents_ingested, 4);
        assert_eq!(snapshot.corpus_documents, 4);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = QaMetrics::new();
        assert_eq!(metrics.snapshot().queries_answered, 0);
        assert_eq!(metrics.snapshot().queries_failed, 0);
    }
}
