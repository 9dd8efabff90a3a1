//! Plagiarism pipeline: extraction, summarization, chunking, search, and scoring.

pub mod chunking;
pub mod scoring;
mod service;
pub mod types;

pub use scoring::Match;
pub use service::{PlagiarismApi, PlagiarismService};
pub use types::{CheckError, EMPTY_CONTENT_MESSAGE, PlagiarismReport, StartupError};
