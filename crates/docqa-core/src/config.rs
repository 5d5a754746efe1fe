//! Configuration types for the retrieval pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the retrieval pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaConfig {
    /// Search and ranking configuration.
    #[serde(default)]
    pub search: SearchConfig,

    /// BM25 scoring constants.
    #[serde(default)]
    pub bm25: Bm25Config,

    /// External service endpoints.
    #[serde(default)]
    pub services: ServicesConfig,

    /// Retry policy for retrieval-critical service calls.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Search and ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of hits requested from each retrieval method.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Number of passages returned to the generation step.
    #[serde(default = "default_final_k")]
    pub final_k: usize,

    /// RRF fusion constant k.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,

    /// Extra candidates kept beyond `top_k` when truncating the fused list
    /// to the rerank pool.
    #[serde(default = "default_rerank_margin")]
    pub rerank_margin: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            final_k: 3,
            rrf_k: 60,
            rerank_margin: 5,
        }
    }
}

impl SearchConfig {
    /// Size of the pool handed to the reranker.
    pub fn rerank_pool_size(&self) -> usize {
        self.top_k + self.rerank_margin
    }
}

/// BM25 scoring constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term-frequency saturation parameter.
    #[serde(default = "default_k1")]
    pub k1: f32,

    /// Length normalization parameter.
    #[serde(default = "default_b")]
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// External service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Text generation service (query rewriting).
    #[serde(default = "default_generation_endpoint")]
    pub generation: EndpointConfig,

    /// Embedding service.
    #[serde(default = "default_embedding_endpoint")]
    pub embedding: EndpointConfig,

    /// Vector index service.
    #[serde(default = "default_vector_index_endpoint")]
    pub vector_index: EndpointConfig,

    /// Relevance scoring service (reranking).
    #[serde(default = "default_rerank_endpoint")]
    pub rerank: EndpointConfig,

    /// Request timeout in seconds, applied to every service call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            generation: default_generation_endpoint(),
            embedding: default_embedding_endpoint(),
            vector_index: default_vector_index_endpoint(),
            rerank: default_rerank_endpoint(),
            timeout_secs: 30,
        }
    }
}

impl ServicesConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// One external service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL of the service.
    pub endpoint: String,

    /// Bearer token, if the service requires one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name, for services that take one.
    #[serde(default)]
    pub model: Option<String>,

    /// Embedding dimension (embedding service only).
    #[serde(default)]
    pub dimension: Option<usize>,
}

/// Retry policy for retrieval-critical service calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first (2 = retry once).
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Backoff between attempts in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 2,
            backoff_ms: 250,
        }
    }
}

impl RetryConfig {
    /// Backoff as a `Duration`.
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

// Default value functions

fn default_top_k() -> usize {
    10
}

fn default_final_k() -> usize {
    3
}

fn default_rrf_k() -> u32 {
    60
}

fn default_rerank_margin() -> usize {
    5
}

fn default_k1() -> f32 {
    1.5
}

fn default_b() -> f32 {
    0.75
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_attempts() -> u32 {
    2
}

fn default_backoff_ms() -> u64 {
    250
}

fn default_generation_endpoint() -> EndpointConfig {
    EndpointConfig {
        endpoint: "http://localhost:11434".to_string(),
        api_key: None,
        model: Some("llama3.1".to_string()),
        dimension: None,
    }
}

fn default_embedding_endpoint() -> EndpointConfig {
    EndpointConfig {
        endpoint: "http://localhost:11434".to_string(),
        api_key: None,
        model: Some("all-minilm".to_string()),
        dimension: Some(384),
    }
}

fn default_vector_index_endpoint() -> EndpointConfig {
    EndpointConfig {
        endpoint: "http://localhost:8080".to_string(),
        api_key: None,
        model: None,
        dimension: None,
    }
}

fn default_rerank_endpoint() -> EndpointConfig {
    EndpointConfig {
        endpoint: "http://localhost:8081".to_string(),
        api_key: None,
        model: Some("ms-marco-minilm".to_string()),
        dimension: None,
    }
}

impl QaConfig {
    /// Load configuration from file.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            crate::error::QaError::Config {
                message: format!("Failed to parse config: {}", e),
            }
        })?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> crate::error::Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("docqa").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("docqa.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        // Return defaults
        Ok(Self::default())
    }
}
