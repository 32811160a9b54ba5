//! Question-answering capability abstraction and adapters.
//!
//! The request handler only depends on [`QaCapability`]; which backend answers is decided once
//! at process construction by [`build_capability`].

mod extractive;
mod openai;
pub mod retriever;

pub use extractive::ExtractiveCapability;
pub use openai::{DEFAULT_HTTP_TIMEOUT, OpenAiCapability};

use crate::config::{CapabilityProvider, Config, ConfigError};
use crate::corpus::Document;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a QA capability.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Upstream provider could not be reached or answered with a failure status.
    #[error("QA provider unavailable: {0}")]
    Unavailable(String),
    /// Upstream provider answered with a body that could not be understood.
    #[error("Malformed QA provider response: {0}")]
    InvalidResponse(String),
    /// Capability failed internally.
    #[error("{0}")]
    Internal(String),
}

/// One scored answer; candidates are returned best-first.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerCandidate {
    /// Answer text.
    pub text: String,
    /// Relative confidence; only meaningful within one result list.
    pub score: f32,
    /// Document the answer was taken from, when known.
    pub source: Option<PathBuf>,
}

impl AnswerCandidate {
    /// Candidate without provenance.
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
            source: None,
        }
    }
}

/// Interface implemented by question-answering backends.
#[async_trait]
pub trait QaCapability: Send + Sync {
    /// Answer `query` against `corpus`.
    ///
    /// `top_k_retrieve` bounds how many documents are considered and `top_k_read` how many
    /// candidates are returned. The result is ordered best-first and may be empty.
    async fn query(
        &self,
        corpus: &[Document],
        query: &str,
        top_k_retrieve: usize,
        top_k_read: usize,
    ) -> Result<Vec<AnswerCandidate>, CapabilityError>;
}

/// Build the capability selected by configuration.
///
/// Fails when the hosted provider is selected without a credential.
pub fn build_capability(
    config: &Config,
    provider: CapabilityProvider,
) -> Result<Arc<dyn QaCapability>, ConfigError> {
    config.require_credential(provider)?;
    match provider {
        CapabilityProvider::Extractive => {
            tracing::info!("Using local extractive QA capability");
            Ok(Arc::new(ExtractiveCapability::new()))
        }
        CapabilityProvider::OpenAI => {
            let api_key = config.openai_api_key.clone().unwrap_or_default();
            tracing::info!(
                base_url = %config.openai_base_url,
                model = %config.openai_model,
                "Using OpenAI QA capability"
            );
            let timeout = config
                .request_timeout_secs
                .map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_secs);
            let capability = OpenAiCapability::with_timeout(
                config.openai_base_url.clone(),
                api_key,
                config.openai_model.clone(),
                timeout,
            )
            .map_err(|error| ConfigError::InvalidValue(format!("OPENAI_BASE_URL ({error})")))?;
            Ok(Arc::new(capability))
        }
    }
}
