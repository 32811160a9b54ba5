//! Core data types and error definitions for corpus ingestion.

use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Extracted text of one source file plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier assigned at conversion time.
    pub id: Uuid,
    /// Plain text extracted from the source file.
    pub content: String,
    /// File the text was extracted from.
    pub source: PathBuf,
}

impl Document {
    /// Build a document with a fresh identifier.
    pub fn new(content: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            source: source.into(),
        }
    }
}

/// Where a corpus comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    /// Folder scanned (non-recursively) for PDF files at ingestion time.
    Folder(PathBuf),
    /// Explicit file list fixed when the process starts.
    Files(Vec<PathBuf>),
}

impl CorpusSource {
    /// Short human-readable label used in logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Folder(path) => format!("folder {}", path.display()),
            Self::Files(files) => format!("{} fixed file(s)", files.len()),
        }
    }
}

/// Errors raised by a document converter for a single file.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// File could not be read from disk.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    /// File was read but its contents could not be parsed.
    #[error("failed to extract text: {0}")]
    Extraction(String),
}

/// Errors raised while turning a [`CorpusSource`] into documents.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Source location could not be enumerated.
    #[error("failed to list documents in {path}: {source}")]
    Discovery {
        /// Folder being scanned.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: walkdir::Error,
    },
    /// One file failed to convert; the whole ingestion is abandoned.
    #[error("failed to convert {path}: {source}")]
    Conversion {
        /// File that failed to convert.
        path: PathBuf,
        /// Converter failure.
        #[source]
        source: ConversionError,
    },
    /// Blocking conversion task was cancelled or panicked.
    #[error("conversion task for {path} did not complete: {message}")]
    Task {
        /// File whose conversion task failed.
        path: PathBuf,
        /// Join error description.
        message: String,
    },
}

impl IngestionError {
    /// Path of the file or folder the failure relates to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Discovery { path, .. }
            | Self::Conversion { path, .. }
            | Self::Task { path, .. } => path,
        }
    }
}

/// Counters describing a completed ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Number of files handed to the converter.
    pub files: usize,
    /// Number of documents appended to the store.
    pub documents: usize,
    /// Documents removed before ingesting (replace mode only).
    pub cleared: usize,
}
