//! Plagiarism service coordinating extraction, summarization, search, and scoring.

use crate::{
    config::Config,
    embedding::{EmbeddingClient, EmbeddingClientError, get_embedding_client},
    extraction::{Document, extract_text},
    metrics::{CheckMetrics, MetricsSnapshot},
    processing::{
        chunking::search_chunks,
        scoring::{Match, PlagiarismTally, cosine_similarity},
        types::{CheckError, PlagiarismReport, StartupError},
    },
    search::{SearxngClient, WebSearchClient},
    summarization::{SummarizationClient, SummarizationRequest, get_summarization_client},
};
use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::Instrument;

/// Characters of extracted text handed to the summarizer.
pub const SUMMARY_INPUT_CHARS: usize = 2000;
/// Lower bound on summary length, in words.
pub const SUMMARY_MIN_WORDS: usize = 30;
/// Upper bound on summary length, in words.
pub const SUMMARY_MAX_WORDS: usize = 130;
/// Search results scored per chunk.
pub const RESULTS_PER_CHUNK: usize = 3;

/// Runs the plagiarism pipeline against long-lived model and search clients.
///
/// The summarizer and embedder are loaded once in [`PlagiarismService::new`] and only read
/// afterwards, so a single instance can be shared across requests through an `Arc`.
pub struct PlagiarismService {
    summarizer: Box<dyn SummarizationClient>,
    embedder: Box<dyn EmbeddingClient>,
    search: Box<dyn WebSearchClient>,
    metrics: CheckMetrics,
    search_concurrency: usize,
}

/// Abstraction over the plagiarism pipeline used by the HTTP surface.
#[async_trait]
pub trait PlagiarismApi: Send + Sync {
    /// Extract, summarize, and score an uploaded document.
    async fn check_document(&self, document: Document) -> Result<PlagiarismReport, CheckError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl PlagiarismService {
    /// Build the service from configuration, loading both models before returning.
    pub async fn new(config: &Config) -> Result<Self, StartupError> {
        tracing::info!(provider = ?config.summarization_provider, "Initializing summarizer");
        let summarizer = get_summarization_client(config)?;
        summarizer.load().await?;

        tracing::info!(provider = ?config.embedding_provider, "Initializing embedder");
        let embedder = get_embedding_client(config)?;
        embedder.load().await?;

        let search = SearxngClient::new(config.search_url.clone())?;
        tracing::info!("Models loaded and ready");

        Ok(Self::with_clients(
            summarizer,
            embedder,
            Box::new(search),
            config.search_concurrency,
        ))
    }

    /// Assemble a service from already-prepared clients.
    ///
    /// `search_concurrency` bounds how many chunks are searched at once; `1` processes chunks
    /// strictly one after another. Matches are reported in chunk order either way.
    pub fn with_clients(
        summarizer: Box<dyn SummarizationClient>,
        embedder: Box<dyn EmbeddingClient>,
        search: Box<dyn WebSearchClient>,
        search_concurrency: usize,
    ) -> Self {
        Self {
            summarizer,
            embedder,
            search,
            metrics: CheckMetrics::new(),
            search_concurrency: search_concurrency.max(1),
        }
    }

    /// Run the full pipeline for one document.
    pub async fn check_document(
        &self,
        document: Document,
    ) -> Result<PlagiarismReport, CheckError> {
        let text = extract_text(&document)?;
        drop(document);
        if text.trim().is_empty() {
            tracing::warn!("Document has no readable text");
            return Err(CheckError::EmptyContent);
        }
        tracing::debug!(chars = text.chars().count(), "Text extracted");

        let summary = self.summarize(&text).await?;
        tracing::debug!(words = summary.split_whitespace().count(), "Summary generated");

        let chunks = search_chunks(&text);
        // Collected up front: a lazy `map` over borrowed chunks is not `Send` under async_trait.
        let pending: Vec<_> = chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| self.score_chunk(index, chunk))
            .collect();
        let per_chunk: Vec<Vec<Match>> = stream::iter(pending)
            .buffered(self.search_concurrency)
            .try_collect()
            .await?;

        let mut tally = PlagiarismTally::new();
        for found in per_chunk.into_iter().flatten() {
            tally.record(found);
        }
        self.metrics
            .record_check(chunks.len() as u64, tally.matches().len() as u64);

        let (plagiarism_percent, plagiarism_matches) = tally.finish();
        tracing::info!(
            chunks = chunks.len(),
            matches = plagiarism_matches.len(),
            plagiarism_percent,
            "Plagiarism check completed"
        );

        Ok(PlagiarismReport {
            plagiarism_percent,
            plagiarism_matches,
            summary,
        })
    }

    async fn summarize(&self, text: &str) -> Result<String, CheckError> {
        let request = SummarizationRequest {
            text: text.chars().take(SUMMARY_INPUT_CHARS).collect(),
            min_words: SUMMARY_MIN_WORDS,
            max_words: SUMMARY_MAX_WORDS,
        };
        Ok(self.summarizer.generate_summary(request).await?)
    }

    /// Search one chunk and keep the results whose snippets clear the similarity threshold.
    async fn score_chunk(&self, index: usize, chunk: &str) -> Result<Vec<Match>, CheckError> {
        async move {
            let mut results = self.search.search(chunk, RESULTS_PER_CHUNK).await?;
            results.truncate(RESULTS_PER_CHUNK);
            if results.is_empty() {
                tracing::debug!("No search results");
                return Ok(Vec::new());
            }

            let mut texts = Vec::with_capacity(results.len() + 1);
            texts.push(chunk.to_string());
            texts.extend(results.iter().map(|result| result.snippet.clone()));
            let expected = texts.len();

            let vectors = self.embedder.generate_embeddings(texts).await?;
            if vectors.len() != expected {
                return Err(EmbeddingClientError::GenerationFailed(format!(
                    "expected {expected} vectors, got {}",
                    vectors.len()
                ))
                .into());
            }
            let (chunk_vector, snippet_vectors) = vectors.split_at(1);
            let chunk_vector = &chunk_vector[0];

            let matches: Vec<Match> = results
                .into_iter()
                .zip(snippet_vectors)
                .filter_map(|(result, vector)| {
                    let similarity = cosine_similarity(chunk_vector, vector);
                    tracing::trace!(similarity, source = ?result.source, "Scored snippet");
                    Match::evaluate(result.source, &result.snippet, similarity)
                })
                .collect();
            tracing::debug!(matches = matches.len(), "Chunk scored");
            Ok(matches)
        }
        .instrument(tracing::debug_span!("chunk", index))
        .await
    }

    /// Return the current check metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl PlagiarismApi for PlagiarismService {
    async fn check_document(&self, document: Document) -> Result<PlagiarismReport, CheckError> {
        PlagiarismService::check_document(self, document).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        PlagiarismService::metrics_snapshot(self)
    }
}
