//! Relevance scoring service client (reranking).

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::{EndpointConfig, QaError, RelevanceScorer, Result};

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [&'a str],
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankEntry>,
}

#[derive(Deserialize)]
struct RerankEntry {
    index: usize,
    relevance_score: f32,
}

/// Client for a rerank-API-style relevance scoring endpoint.
///
/// The service returns (index, score) entries in its own order; the client
/// restores input order so callers get one score per passage.
pub struct HttpRelevanceScorer {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpRelevanceScorer {
    /// Create a new client from endpoint configuration.
    pub fn new(config: &EndpointConfig, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QaError::rerank(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| "ms-marco-minilm".to_string()),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl RelevanceScorer for HttpRelevanceScorer {
    async fn score_pairs(&self, question: &str, passages: &[&str]) -> Result<Vec<f32>> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/rerank", self.endpoint);
        let request = RerankRequest {
            model: &self.model,
            query: question,
            documents: passages,
        };

        debug!("Rerank request to {} ({} passages)", url, passages.len());

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| QaError::rerank(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| QaError::rerank(format!("Service returned error: {}", e)))?;

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| QaError::rerank(format!("Malformed response: {}", e)))?;

        if parsed.results.len() != passages.len() {
            return Err(QaError::rerank(format!(
                "Score count mismatch: sent {} passages, got {} scores",
                passages.len(),
                parsed.results.len()
            )));
        }

        // Restore input order
        let mut scores = vec![0.0f32; passages.len()];
        for entry in parsed.results {
            if entry.index >= scores.len() {
                return Err(QaError::rerank(format!(
                    "Result index {} out of range",
                    entry.index
                )));
            }
            scores[entry.index] = entry.relevance_score;
        }

        Ok(scores)
    }
}

/// Deterministic relevance scorer for tests.
///
/// Scores each passage from a fixed table (unlisted passages score 0.0), or
/// always fails when constructed with [`MockRelevanceScorer::failing`].
pub struct MockRelevanceScorer {
    scores: HashMap<String, f32>,
    fail: bool,
}

impl MockRelevanceScorer {
    /// Score passages from a `(passage, score)` table.
    pub fn with_scores(scores: impl IntoIterator<Item = (String, f32)>) -> Self {
        Self {
            scores: scores.into_iter().collect(),
            fail: false,
        }
    }

    /// Always fail, for exercising the fusion-order fallback.
    pub fn failing() -> Self {
        Self {
            scores: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl RelevanceScorer for MockRelevanceScorer {
    async fn score_pairs(&self, _question: &str, passages: &[&str]) -> Result<Vec<f32>> {
        if self.fail {
            return Err(QaError::rerank("mock scorer configured to fail"));
        }

        Ok(passages
            .iter()
            .map(|p| self.scores.get(*p).copied().unwrap_or(0.0))
            .collect())
    }
}
