//! Capability traits for the external services the pipeline depends on.
//!
//! Each capability has one production implementation (an HTTP client in
//! `docqa-services`) and one deterministic mock for tests, so fusion and
//! reranking logic can be exercised without network access.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::VectorMatch;

/// Text generation capability, used for query rewriting.
///
/// Best-effort: callers are expected to tolerate failures.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Embedding capability: turns text into a fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding dimension.
    fn dimension(&self) -> usize;
}

/// External vector index: nearest-neighbor search over stored embeddings.
///
/// The returned matches are already sorted by similarity descending; the
/// caller must not re-sort or re-score them. The index service owns the
/// similarity semantics (e.g. cosine).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Query for the `top_k` most similar stored vectors.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>>;
}

/// Pairwise relevance scoring (cross-encoder style), used for reranking.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score each (question, passage) pair.
    ///
    /// Returns one score per passage, in input order.
    async fn score_pairs(&self, question: &str, passages: &[&str]) -> Result<Vec<f32>>;
}
