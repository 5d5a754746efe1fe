//! Vector index service client.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::{ChunkId, EndpointConfig, QaError, Result, VectorIndex, VectorMatch};

#[derive(Serialize)]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    matches: Vec<Match>,
}

#[derive(Deserialize)]
struct Match {
    id: String,
    score: f32,
}

/// Client for a Pinecone-style vector index query endpoint.
///
/// Record ids in the index are the hex encoding of the canonical chunk id,
/// written by the ingestion collaborator. The client interprets the returned
/// match order as the ranking; it never re-sorts or re-scores.
pub struct HttpVectorIndex {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpVectorIndex {
    /// Create a new client from endpoint configuration.
    pub fn new(config: &EndpointConfig, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QaError::vector_index(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl VectorIndex for HttpVectorIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        let url = format!("{}/query", self.endpoint);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: false,
        };

        debug!("Vector query to {} (top_k={})", url, top_k);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| QaError::vector_index(format!("Request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| QaError::vector_index(format!("Service returned error: {}", e)))?;

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| QaError::vector_index(format!("Malformed response: {}", e)))?;

        parsed
            .matches
            .into_iter()
            .map(|m| {
                let chunk_id = ChunkId::from_hex(&m.id)
                    .map_err(|e| QaError::vector_index(format!("Bad match id {:?}: {}", m.id, e)))?;
                Ok(VectorMatch {
                    chunk_id,
                    score: m.score,
                })
            })
            .collect()
    }
}

/// Deterministic vector index for tests.
///
/// Serves a preloaded match list regardless of the query vector, optionally
/// failing a configured number of times first (for retry tests).
pub struct MockVectorIndex {
    matches: Vec<VectorMatch>,
    failures_remaining: AtomicUsize,
    calls: AtomicUsize,
}

impl MockVectorIndex {
    /// Serve the given matches on every query.
    pub fn serving(matches: Vec<VectorMatch>) -> Self {
        Self {
            matches,
            failures_remaining: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail the first `failures` queries, then serve the matches.
    pub fn failing_then_serving(failures: usize, matches: Vec<VectorMatch>) -> Self {
        Self {
            matches,
            failures_remaining: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of queries received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for MockVectorIndex {
    async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(QaError::vector_index("mock index configured to fail"));
        }

        Ok(self.matches.iter().take(top_k).cloned().collect())
    }
}
