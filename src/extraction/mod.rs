//! Plain-text extraction for uploaded documents.
//!
//! The parser is chosen from the filename suffix alone: `.pdf` goes through `lopdf`, `.docx`
//! through `docx-rs`. Anything else is rejected before the bytes are touched. An empty result is
//! not an error here; the processing service decides what an empty document means.

mod docx;
mod pdf;

use thiserror::Error;

/// Errors raised while turning an uploaded document into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Filename does not end in a supported extension.
    #[error("Unsupported file type. Use PDF or DOCX.")]
    UnsupportedFormat,
    /// PDF bytes could not be parsed.
    #[error("Failed to read PDF: {0}")]
    Pdf(String),
    /// DOCX bytes could not be parsed.
    #[error("Failed to read DOCX: {0}")]
    Docx(String),
}

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
}

impl DocumentKind {
    /// Select a parser from the filename suffix.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        if filename.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else if filename.ends_with(".docx") {
            Ok(Self::Docx)
        } else {
            Err(ExtractionError::UnsupportedFormat)
        }
    }
}

/// An uploaded document awaiting extraction.
#[derive(Debug, Clone)]
pub struct Document {
    /// Client-supplied filename; only its extension is significant.
    pub filename: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Document {
    /// Wrap uploaded bytes together with their filename.
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Extract the full plain-text content of a document.
pub fn extract_text(document: &Document) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_filename(&document.filename)?;
    tracing::debug!(
        filename = %document.filename,
        kind = ?kind,
        bytes = document.bytes.len(),
        "Extracting document text"
    );
    match kind {
        DocumentKind::Pdf => pdf::extract(&document.bytes),
        DocumentKind::Docx => docx::extract(&document.bytes),
    }
}
