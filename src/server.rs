//! Process construction: choose the capability, build the store and service, return the router.
//!
//! Everything that can make the process unfit to serve (missing credential, fixed corpus that
//! fails to ingest) is checked here, before a listener is bound.

use crate::{
    api,
    capability::{QaCapability, build_capability},
    config::{CapabilityProvider, Config, ConfigError},
    corpus::{
        CorpusLoader, CorpusSource, CorpusStore, DocumentConverter, IngestionError, PdfConverter,
    },
    qa::{QaService, QuerySettings},
};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Which of the two services to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// Each request names a folder that is ingested before answering.
    Folder,
    /// Files ingested once at startup.
    Fixed(Vec<PathBuf>),
}

impl Variant {
    /// Capability used when `QA_CAPABILITY` is not set.
    pub fn default_capability(&self) -> CapabilityProvider {
        match self {
            Self::Folder => CapabilityProvider::Extractive,
            Self::Fixed(_) => CapabilityProvider::OpenAI,
        }
    }
}

/// Errors that prevent the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Fixed corpus could not be ingested.
    #[error("failed to load fixed corpus: {0}")]
    Ingestion(#[from] IngestionError),
}

/// Build the router for `variant` with the production converter and configured capability.
pub async fn build_app(config: &Config, variant: &Variant) -> Result<Router, StartupError> {
    let provider = config.capability_or(variant.default_capability());
    let capability = build_capability(config, provider)?;
    let service = build_service(config, variant, capability, Arc::new(PdfConverter::new())).await?;
    Ok(router_for(variant, service))
}

/// Build the query service, preloading the corpus for the fixed variant.
pub async fn build_service(
    config: &Config,
    variant: &Variant,
    capability: Arc<dyn QaCapability>,
    converter: Arc<dyn DocumentConverter>,
) -> Result<Arc<QaService>, IngestionError> {
    let store = Arc::new(CorpusStore::new());
    let loader = CorpusLoader::new(converter, config.ingest_mode);
    let service = QaService::new(store, loader, capability, QuerySettings::from_config(config));

    if let Variant::Fixed(files) = variant {
        let summary = service.preload(&CorpusSource::Files(files.clone())).await?;
        tracing::info!(
            files = summary.files,
            documents = summary.documents,
            "Fixed corpus loaded"
        );
    }
    Ok(Arc::new(service))
}

/// Router exposing `service` with the request shape of `variant`.
pub fn router_for(variant: &Variant, service: Arc<QaService>) -> Router {
    match variant {
        Variant::Folder => api::create_folder_router(service),
        Variant::Fixed(_) => api::create_fixed_router(service),
    }
}
