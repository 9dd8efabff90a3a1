//! Embedding clients used to compare document chunks with search snippets.
//!
//! Two backends are available: an Ollama adapter that calls `/api/embed`, and a deterministic
//! feature-hashing embedder that needs no model at all. Either one is built once at startup and
//! shared read-only by every request.

use crate::config::{Config, EmbeddingProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider could not be reached.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
}

impl From<reqwest::Error> for EmbeddingClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::ProviderUnavailable(error.to_string())
    }
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Make the model resident before the first request is served.
    async fn load(&self) -> Result<(), EmbeddingClientError> {
        Ok(())
    }

    /// Produce an embedding vector for each supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Build the embedding client selected by configuration.
pub fn get_embedding_client(
    config: &Config,
) -> Result<Box<dyn EmbeddingClient>, EmbeddingClientError> {
    match config.embedding_provider {
        EmbeddingProvider::Ollama => Ok(Box::new(OllamaEmbeddingClient::new(
            config.ollama_url.clone(),
            config.embedding_model.clone(),
        )?)),
        EmbeddingProvider::Hashing => Ok(Box::new(HashingEmbeddingClient::new(
            config.embedding_dimension,
        ))),
    }
}

/// Ollama `/api/embed` adapter.
pub struct OllamaEmbeddingClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbeddingClient {
    /// Construct a client for `model` served by the Ollama runtime at `base_url`.
    pub fn new(base_url: String, model: String) -> Result<Self, EmbeddingClientError> {
        let http = Client::builder().user_agent("plagscan/embed").build()?;
        Ok(Self {
            http,
            base_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embed", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn load(&self) -> Result<(), EmbeddingClientError> {
        tracing::info!(model = %self.model, url = %self.base_url, "Loading embedding model");
        let vectors = self.generate_embeddings(vec!["warm up".into()]).await?;
        tracing::info!(
            model = %self.model,
            dimension = vectors.first().map(Vec::len).unwrap_or_default(),
            "Embedding model ready"
        );
        Ok(())
    }

    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let expected = texts.len();

        let response = self
            .http
            .post(self.endpoint())
            .json(&json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await
            .map_err(|error| {
                EmbeddingClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaEmbedResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::GenerationFailed(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if body.embeddings.len() != expected {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "expected {expected} vectors, got {}",
                body.embeddings.len()
            )));
        }
        Ok(body.embeddings)
    }
}

/// Deterministic signed feature-hashing embedder.
///
/// Each token from `tokenize` is hashed into one of `dimension` slots with a sign taken
/// from the hash, then the vector is L2-normalized. Texts sharing vocabulary land close together;
/// texts with disjoint vocabulary are near-orthogonal.
pub struct HashingEmbeddingClient {
    dimension: usize,
}

impl HashingEmbeddingClient {
    /// Construct an embedder producing vectors of `dimension` components.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimension];

        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut prefix = [0_u8; 8];
            prefix.copy_from_slice(&digest[..8]);
            let hash = u64::from_le_bytes(prefix);
            let slot = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[slot] += sign;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        embedding
    }
}

/// Split text into lowercase alphanumeric runs.
///
/// Words made only of symbols (`----`, `====`) are kept whole, and non-empty text with no words
/// at all becomes a single token, so no non-empty text encodes to the zero vector.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        let before = tokens.len();
        tokens.extend(
            word.split(|c: char| !c.is_alphanumeric())
                .filter(|token| !token.is_empty())
                .map(str::to_lowercase),
        );
        if tokens.len() == before {
            tokens.push(word.to_string());
        }
    }
    if tokens.is_empty() && !text.is_empty() {
        tokens.push(text.to_string());
    }
    tokens
}

#[async_trait]
impl EmbeddingClient for HashingEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }
        Ok(texts.iter().map(|text| self.encode(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn hashing_embedder_is_deterministic_and_normalized() {
        let client = HashingEmbeddingClient::new(64);
        let vectors = client
            .generate_embeddings(vec!["Rust borrows checked".into(), "Rust borrows checked".into()])
            .await
            .expect("embeddings");

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vectors[1]);
        assert!((dot(&vectors[0], &vectors[0]) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn hashing_embedder_ignores_case_and_punctuation() {
        let client = HashingEmbeddingClient::new(128);
        let vectors = client
            .generate_embeddings(vec!["Hello, World!".into(), "hello world".into()])
            .await
            .expect("embeddings");
        assert!((dot(&vectors[0], &vectors[1]) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn hashing_embedder_returns_zero_vector_for_empty_text() {
        let client = HashingEmbeddingClient::new(16);
        let vectors = client
            .generate_embeddings(vec![String::new()])
            .await
            .expect("embeddings");
        assert!(vectors[0].iter().all(|value| *value == 0.0));
    }

    #[tokio::test]
    async fn hashing_embedder_encodes_symbol_only_text() {
        let client = HashingEmbeddingClient::new(384);
        let rule = "=".repeat(500);
        let vectors = client
            .generate_embeddings(vec![
                rule.clone(),
                rule,
                "\n".into(),
                "\n".into(),
                "---- | ----".into(),
            ])
            .await
            .expect("embeddings");

        for vector in &vectors {
            assert!((dot(vector, vector) - 1.0).abs() < 1e-5);
        }
        assert!((dot(&vectors[0], &vectors[1]) - 1.0).abs() < 1e-5);
        assert!((dot(&vectors[2], &vectors[3]) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn tokenize_keeps_symbol_words_whole() {
        assert_eq!(tokenize("Hello, World!"), vec!["hello", "world"]);
        assert_eq!(tokenize("a -- b"), vec!["a", "--", "b"]);
        assert_eq!(tokenize("\n"), vec!["\n"]);
        assert!(tokenize("").is_empty());
    }

    #[tokio::test]
    async fn ollama_load_embeds_warm_up_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/embed")
                    .json_body(json!({ "model": "all-minilm", "input": ["warm up"] }));
                then.status(200)
                    .json_body(json!({ "embeddings": [[0.5, 0.5, 0.5]] }));
            })
            .await;

        let client =
            OllamaEmbeddingClient::new(server.base_url(), "all-minilm".into()).expect("client");
        client.load().await.expect("load");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn hashing_embedder_rejects_zero_dimension() {
        let client = HashingEmbeddingClient::new(0);
        let error = client
            .generate_embeddings(vec!["text".into()])
            .await
            .expect_err("zero dimension");
        assert!(matches!(error, EmbeddingClientError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn ollama_client_returns_vectors_in_order() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/embed")
                    .json_body(json!({ "model": "all-minilm", "input": ["a", "b"] }));
                then.status(200).json_body(json!({
                    "model": "all-minilm",
                    "embeddings": [[1.0, 0.0], [0.0, 1.0]]
                }));
            })
            .await;

        let client =
            OllamaEmbeddingClient::new(server.base_url(), "all-minilm".into()).expect("client");
        let vectors = client
            .generate_embeddings(vec!["a".into(), "b".into()])
            .await
            .expect("embeddings");

        mock.assert_async().await;
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn ollama_client_rejects_short_responses() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(200).json_body(json!({ "embeddings": [[1.0]] }));
            })
            .await;

        let client =
            OllamaEmbeddingClient::new(server.base_url(), "all-minilm".into()).expect("client");
        let error = client
            .generate_embeddings(vec!["a".into(), "b".into()])
            .await
            .expect_err("vector count mismatch");
        assert!(error.to_string().contains("expected 2 vectors"));
    }

    #[tokio::test]
    async fn ollama_client_surfaces_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embed");
                then.status(500).body("model not found");
            })
            .await;

        let client =
            OllamaEmbeddingClient::new(server.base_url(), "missing".into()).expect("client");
        let error = client.load().await.expect_err("load fails");
        assert!(
            matches!(&error, EmbeddingClientError::GenerationFailed(message) if message.contains("500"))
        );
    }
}
