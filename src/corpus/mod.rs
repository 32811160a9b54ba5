//! Corpus ingestion: PDF discovery, text conversion, and the in-memory document store.

pub mod convert;
mod loader;
pub mod store;
pub mod types;

pub use convert::{DocumentConverter, PdfConverter};
pub use loader::{CorpusLoader, DOCUMENT_EXTENSION};
pub use store::{CorpusStore, StoreReadGuard, StoreWriteGuard};
pub use types::{ConversionError, CorpusSource, Document, IngestSummary, IngestionError};
