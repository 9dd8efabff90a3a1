#![deny(missing_docs)]

//! Core library for the plagscan server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Plain-text extraction from uploaded documents.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Check metrics helpers.
pub mod metrics;
/// Plagiarism pipeline orchestration.
pub mod processing;
/// Web search collaborator.
pub mod search;
/// Summarization client abstraction and adapters.
pub mod summarization;
