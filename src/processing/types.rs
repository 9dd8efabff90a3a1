//! Report types and error definitions for the plagiarism pipeline.

use crate::{
    embedding::EmbeddingClientError, extraction::ExtractionError, search::SearchError,
    summarization::SummarizationClientError,
};
use serde::Serialize;
use thiserror::Error;

use super::scoring::Match;

/// Message returned when a document holds no readable text.
pub const EMPTY_CONTENT_MESSAGE: &str = "File has no readable text";

/// Errors emitted while checking a document.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The document could not be parsed, including unsupported file types.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// Extraction succeeded but produced only whitespace.
    #[error("File has no readable text")]
    EmptyContent,
    /// Summarization provider failed.
    #[error(transparent)]
    Summarization(#[from] SummarizationClientError),
    /// Search provider failed.
    #[error(transparent)]
    Search(#[from] SearchError),
    /// Embedding provider failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingClientError),
}

impl CheckError {
    /// Whether the failure was caused by the uploaded content rather than the service.
    ///
    /// Only empty documents qualify; unsupported file types are reported as server failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyContent)
    }
}

/// Errors that prevent the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Summarization model could not be prepared.
    #[error("Failed to load summarization model: {0}")]
    Summarization(#[from] SummarizationClientError),
    /// Embedding model could not be prepared.
    #[error("Failed to load embedding model: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Search client could not be constructed.
    #[error("Failed to initialize search client: {0}")]
    Search(#[from] SearchError),
}

/// Outcome of a plagiarism check returned to API consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlagiarismReport {
    /// `min(10 × matches, 100)`.
    pub plagiarism_percent: u32,
    /// Matches in chunk order, then search-result order.
    pub plagiarism_matches: Vec<Match>,
    /// Abstractive summary of the document's opening.
    pub summary: String,
}
