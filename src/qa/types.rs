//! Request-level types and the error union surfaced to the HTTP layer.

use crate::capability::CapabilityError;
use crate::corpus::IngestionError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Response text used when the capability returns no candidates.
pub const NO_ANSWER: &str = "No answer found.";

/// Errors that end a query request.
#[derive(Debug, Error)]
pub enum QaError {
    /// Request body was missing fields or carried an unusable value.
    #[error("{0}")]
    Validation(String),
    /// Corpus discovery or conversion failed.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
    /// QA capability failed.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    /// Ingest and query did not finish within the configured bound.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// A validated, non-empty question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
}

impl Query {
    /// Validate raw question text; blank input is rejected.
    pub fn parse(raw: impl Into<String>) -> Result<Self, QaError> {
        let text = raw.into();
        if text.trim().is_empty() {
            return Err(QaError::Validation("query must not be empty".into()));
        }
        Ok(Self { text })
    }

    /// Question text exactly as submitted.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the query, returning its text.
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Result of a successful query request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    /// Question as submitted.
    pub query: String,
    /// Top candidate text, or [`NO_ANSWER`].
    pub response: String,
    /// Whether a candidate was found.
    pub answered: bool,
    /// Number of candidates returned by the capability.
    pub candidates: usize,
}

/// Stages a query request moves through; `Failed` is reachable from every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    /// Request accepted by the handler.
    Received,
    /// Body passed validation.
    Validated,
    /// Folder corpus ingested (folder-scoped variant only).
    CorpusLoaded,
    /// Capability returned its candidates.
    Queried,
    /// Response envelope produced.
    Responded,
    /// Request ended with an error.
    Failed,
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::CorpusLoaded => "corpus_loaded",
            Self::Queried => "queried",
            Self::Responded => "responded",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}
