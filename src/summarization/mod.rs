//! Abstractive summarization clients.
//!
//! The Ollama-backed client issues HTTP requests directly to the runtime, with sampling disabled
//! so a given input and model always produce the same summary. The extractive client needs no
//! model and is the default for offline deployments and tests.

mod extractive;

pub use extractive::ExtractiveSummarizer;

use crate::config::{Config, SummarizationProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced while attempting summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for SummarizationClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::ProviderUnavailable(error.to_string())
    }
}

/// Text to summarize together with its length bounds, in words.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// Source text, already truncated by the caller.
    pub text: String,
    /// Lower bound on summary length.
    pub min_words: usize,
    /// Upper bound on summary length.
    pub max_words: usize,
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Make the model resident before the first request is served.
    async fn load(&self) -> Result<(), SummarizationClientError> {
        Ok(())
    }

    /// Generate a summary within the requested bounds.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Build the summarization client selected by configuration.
pub fn get_summarization_client(
    config: &Config,
) -> Result<Box<dyn SummarizationClient>, SummarizationClientError> {
    match config.summarization_provider {
        SummarizationProvider::Ollama => Ok(Box::new(OllamaSummarizationClient::new(
            config.ollama_url.clone(),
            config.summarization_model.clone(),
        )?)),
        SummarizationProvider::Extractive => Ok(Box::new(ExtractiveSummarizer::new())),
    }
}

/// Ollama `/api/generate` adapter.
pub struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
    done: bool,
}

impl OllamaSummarizationClient {
    /// Construct a client for `model` served by the Ollama runtime at `base_url`.
    pub fn new(base_url: String, model: String) -> Result<Self, SummarizationClientError> {
        let http = Client::builder().user_agent("plagscan/summary").build()?;
        Ok(Self {
            http,
            base_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }

    async fn post(
        &self,
        payload: serde_json::Value,
    ) -> Result<OllamaResponse, SummarizationClientError> {
        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn load(&self) -> Result<(), SummarizationClientError> {
        tracing::info!(model = %self.model, url = %self.base_url, "Loading summarization model");
        // A generate call without a prompt only loads the model.
        self.post(json!({ "model": self.model, "stream": false }))
            .await?;
        tracing::info!(model = %self.model, "Summarization model ready");
        Ok(())
    }

    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": build_prompt(&request),
            "stream": false,
            "options": {
                "temperature": 0.0,
                "seed": 0,
                // Generous token budget; the word ceiling is enforced after generation.
                "num_predict": request.max_words * 2,
            }
        });

        let body = self.post(payload).await?;
        let summary = limit_words(body.response.trim(), request.max_words);
        if summary.is_empty() {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama returned an empty summary".into(),
            ));
        }
        Ok(summary)
    }
}

fn build_prompt(request: &SummarizationRequest) -> String {
    format!(
        "System: You write concise, factual summaries. Avoid speculation. Output a single \
         paragraph of between {min} and {max} words and nothing else.\n\n\
         Summarize the following text:\n\n{text}\n",
        min = request.min_words,
        max = request.max_words,
        text = request.text.trim(),
    )
}

/// Keep at most `max_words` whitespace-separated words, normalizing inner whitespace.
pub(crate) fn limit_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}
