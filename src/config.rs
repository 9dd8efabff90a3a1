use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_SEARCH_URL: &str = "http://127.0.0.1:8888";
const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
const DEFAULT_SUMMARIZATION_MODEL: &str = "llama3.2";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the plagscan server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Embedding backend used to compare chunks with search snippets.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of vectors produced by the hashing embedder.
    pub embedding_dimension: usize,
    /// Backend producing document summaries.
    pub summarization_provider: SummarizationProvider,
    /// Generation model identifier passed to the summarization provider.
    pub summarization_model: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Base URL of the SearxNG instance queried for candidate sources.
    pub search_url: String,
    /// Number of chunks searched and scored concurrently.
    pub search_concurrency: usize,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

/// Supported embedding backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Deterministic in-process feature hashing.
    Hashing,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// Local Ollama runtime.
    Ollama,
    /// Deterministic leading-sentence summaries.
    Extractive,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let search_concurrency: usize = parse_env_or("SEARCH_CONCURRENCY", 1)?;
        if search_concurrency == 0 {
            return Err(ConfigError::InvalidValue("SEARCH_CONCURRENCY".into()));
        }
        let embedding_dimension: usize =
            parse_env_or("EMBEDDING_DIMENSION", DEFAULT_EMBEDDING_DIMENSION)?;
        if embedding_dimension == 0 {
            return Err(ConfigError::InvalidValue("EMBEDDING_DIMENSION".into()));
        }

        Ok(Self {
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            embedding_provider: parse_env_or("EMBEDDING_PROVIDER", EmbeddingProvider::Hashing)?,
            embedding_model: load_env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            embedding_dimension,
            summarization_provider: parse_env_or(
                "SUMMARIZATION_PROVIDER",
                SummarizationProvider::Extractive,
            )?,
            summarization_model: load_env_or("SUMMARIZATION_MODEL", DEFAULT_SUMMARIZATION_MODEL),
            ollama_url: load_env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL),
            search_url: load_env_or("SEARCH_URL", DEFAULT_SEARCH_URL),
            search_concurrency,
            max_upload_bytes: parse_env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: None,
            embedding_provider: EmbeddingProvider::Hashing,
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            summarization_provider: SummarizationProvider::Extractive,
            summarization_model: DEFAULT_SUMMARIZATION_MODEL.into(),
            ollama_url: DEFAULT_OLLAMA_URL.into(),
            search_url: DEFAULT_SEARCH_URL.into(),
            search_concurrency: 1,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_or(key: &str, default: &str) -> String {
    load_env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env_optional(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

impl FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "hashing" => Ok(Self::Hashing),
            _ => Err(()),
        }
    }
}

impl FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "extractive" => Ok(Self::Extractive),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        server_port = ?config.server_port,
        embedding_provider = ?config.embedding_provider,
        summarization_provider = ?config.summarization_provider,
        search_url = %config.search_url,
        search_concurrency = config.search_concurrency,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_parse_case_insensitively() {
        assert_eq!("Ollama".parse::<EmbeddingProvider>(), Ok(EmbeddingProvider::Ollama));
        assert_eq!("HASHING".parse::<EmbeddingProvider>(), Ok(EmbeddingProvider::Hashing));
        assert_eq!(
            "extractive".parse::<SummarizationProvider>(),
            Ok(SummarizationProvider::Extractive)
        );
        assert!("openai".parse::<SummarizationProvider>().is_err());
    }

    #[test]
    fn default_config_is_offline_and_sequential() {
        let config = Config::default();
        assert_eq!(config.embedding_provider, EmbeddingProvider::Hashing);
        assert_eq!(
            config.summarization_provider,
            SummarizationProvider::Extractive
        );
        assert_eq!(config.search_concurrency, 1);
        assert_eq!(config.embedding_dimension, 384);
    }
}
