//! Corpus loader: discover source files and append their documents to the store.

use super::convert::DocumentConverter;
use super::store::StoreWriteGuard;
use super::types::{CorpusSource, Document, IngestSummary, IngestionError};
use crate::config::IngestMode;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// File extension matched during folder discovery (case-sensitive, like a `*.pdf` glob).
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// Turns a [`CorpusSource`] into documents inside a [`crate::corpus::CorpusStore`].
#[derive(Clone)]
pub struct CorpusLoader {
    converter: Arc<dyn DocumentConverter>,
    mode: IngestMode,
}

impl CorpusLoader {
    /// Build a loader around `converter`.
    pub fn new(converter: Arc<dyn DocumentConverter>, mode: IngestMode) -> Self {
        Self { converter, mode }
    }

    /// Convert every file of `source` and write the documents into `store`.
    ///
    /// In [`IngestMode::Append`] the store grows on every call, so ingesting the same folder
    /// twice holds each document twice. [`IngestMode::Replace`] clears the store first. The
    /// first conversion failure aborts the ingestion before anything is written.
    pub async fn ingest(
        &self,
        source: &CorpusSource,
        store: &mut StoreWriteGuard<'_>,
    ) -> Result<IngestSummary, IngestionError> {
        let files = discover(source)?;
        tracing::debug!(source = %source.describe(), files = files.len(), "Discovered corpus files");

        let mut documents = Vec::new();
        for path in &files {
            documents.extend(self.convert_file(path).await?);
        }

        let cleared = match self.mode {
            IngestMode::Replace => store.clear(),
            IngestMode::Append => 0,
        };
        let summary = IngestSummary {
            files: files.len(),
            documents: documents.len(),
            cleared,
        };
        store.write_documents(documents);
        tracing::info!(
            source = %source.describe(),
            files = summary.files,
            documents = summary.documents,
            cleared = summary.cleared,
            store_size = store.len(),
            "Corpus ingested"
        );
        Ok(summary)
    }

    async fn convert_file(&self, path: &Path) -> Result<Vec<Document>, IngestionError> {
        let converter = Arc::clone(&self.converter);
        let owned = path.to_path_buf();
        let joined = tokio::task::spawn_blocking(move || converter.convert(&owned)).await;
        match joined {
            Ok(Ok(documents)) => Ok(documents),
            Ok(Err(source)) => Err(IngestionError::Conversion {
                path: path.to_path_buf(),
                source,
            }),
            Err(error) => Err(IngestionError::Task {
                path: path.to_path_buf(),
                message: error.to_string(),
            }),
        }
    }
}

/// Resolve a source to the ordered list of files to convert.
pub(crate) fn discover(source: &CorpusSource) -> Result<Vec<PathBuf>, IngestionError> {
    match source {
        CorpusSource::Files(files) => Ok(files.clone()),
        CorpusSource::Folder(folder) => discover_folder(folder),
    }
}

/// Folder actually scanned for `folder`; an empty path means the working directory.
fn scan_root(folder: &Path) -> &Path {
    if folder.as_os_str().is_empty() {
        Path::new(".")
    } else {
        folder
    }
}

fn discover_folder(folder: &Path) -> Result<Vec<PathBuf>, IngestionError> {
    let folder = scan_root(folder);
    if !folder.exists() {
        tracing::warn!(folder = %folder.display(), "Corpus folder does not exist; treating as empty");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| IngestionError::Discovery {
            path: folder.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
        if matches_extension && !entry.file_type().is_dir() {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}
