//! Embedding service client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::{Embedder, EndpointConfig, QaError, Result};

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible embeddings endpoint.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
}

impl HttpEmbedder {
    /// Create a new client from endpoint configuration.
    pub fn new(config: &EndpointConfig, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QaError::embedding(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| "all-minilm".to_string()),
            api_key: config.api_key.clone(),
            dimension: config.dimension.unwrap_or(384),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.endpoint);
        let request = EmbeddingsRequest {
            model: &self.model,
            input: text,
        };

        debug!("Embedding request to {}", url);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| QaError::embedding(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| QaError::embedding(format!("Service returned error: {}", e)))?;

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| QaError::embedding(format!("Malformed response: {}", e)))?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| QaError::embedding("Response contained no embeddings"))?;

        if embedding.len() != self.dimension {
            return Err(QaError::embedding(format!(
                "Dimension mismatch: expected {}, got {}",
                self.dimension,
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic embedder for tests.
///
/// Produces a hash-derived, L2-normalized vector so identical inputs always
/// embed identically without any model.
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    /// Create a new mock embedder with default settings.
    pub fn new() -> Self {
        Self { dimension: 384 }
    }

    /// Create a mock embedder with a custom dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
        let mut embedding = vec![0.0f32; self.dimension];
        for (i, v) in embedding.iter_mut().enumerate() {
            *v = ((hash.wrapping_mul(i as u64 + 1)) as f32 % 1000.0) / 1000.0 - 0.5;
        }
        // L2 normalize
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedder_deterministic() {
        let embedder = MockEmbedder::new();
        let a = embedder.embed_query("hello world").await.unwrap();
        let b = embedder.embed_query("hello world").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);

        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_embeddings_response_parsing() {
        let json = r#"{"data":[{"embedding":[0.1,0.2,0.3]}]}"#;
        let parsed: EmbeddingsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2, 0.3]);
    }
}
