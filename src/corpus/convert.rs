//! Document conversion: turn one file on disk into zero or more [`Document`]s.

use super::types::{ConversionError, Document};
use std::path::Path;

/// Interface implemented by file-to-text converters.
///
/// Conversion is blocking; the loader runs it on the blocking thread pool.
pub trait DocumentConverter: Send + Sync {
    /// Extract documents from the file at `path`.
    fn convert(&self, path: &Path) -> Result<Vec<Document>, ConversionError>;
}

/// PDF converter backed by `pdf-extract`.
///
/// Each file becomes a single document. Form feeds that `pdf-extract` inserts between pages are
/// folded into paragraph breaks. A PDF without extractable text (for example a scan) yields no
/// documents rather than an error.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfConverter;

impl PdfConverter {
    /// Construct a new converter.
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentConverter for PdfConverter {
    fn convert(&self, path: &Path) -> Result<Vec<Document>, ConversionError> {
        let bytes = std::fs::read(path)?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|error| ConversionError::Extraction(error.to_string()))?;
        let content = normalize_text(&text);
        if content.is_empty() {
            tracing::warn!(path = %path.display(), "PDF produced no extractable text");
            return Ok(Vec::new());
        }
        tracing::debug!(path = %path.display(), chars = content.len(), "Converted PDF");
        Ok(vec![Document::new(content, path)])
    }
}

fn normalize_text(raw: &str) -> String {
    raw.replace('\x0C', "\n\n").trim().to_string()
}
