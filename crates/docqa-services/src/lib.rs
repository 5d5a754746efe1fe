//! docqa-services - External service clients for docqa
//!
//! Production HTTP implementations of the four capability traits the pipeline
//! depends on (text generation, embedding, vector index, relevance scoring),
//! plus deterministic mock implementations so retrieval logic can be tested
//! without network access.

mod embed;
mod generate;
mod rerank;
mod vector;

pub use embed::{HttpEmbedder, MockEmbedder};
pub use generate::{HttpTextGenerator, MockTextGenerator};
pub use rerank::{HttpRelevanceScorer, MockRelevanceScorer};
pub use vector::{HttpVectorIndex, MockVectorIndex};

// Re-export the capability traits for convenience
pub use docqa_core::{Embedder, RelevanceScorer, TextGenerator, VectorIndex};
