//! docqa-pipeline - Hybrid retrieval and fusion pipeline
//!
//! This crate sequences the full retrieval flow for one question: query
//! rewriting, parallel lexical (BM25) and dense (vector) search, Reciprocal
//! Rank Fusion of the two ranked lists, pairwise reranking of a bounded
//! candidate pool, and final context selection.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_pipeline::{PipelineServices, RetrievalPipeline};
//!
//! let pipeline = RetrievalPipeline::new(corpus, services, &config);
//! let context = pipeline.retrieve_context("What is the grace period?").await?;
//! for passage in &context.passages {
//!     println!("{passage}");
//! }
//! ```

mod engine;
mod fusion;
mod rerank;
mod rewrite;
mod select;

pub use engine::{PipelineServices, RetrievalPipeline};
pub use fusion::reciprocal_rank_fusion;
pub use rerank::{fusion_order_results, rerank_pool};
pub use rewrite::QueryRewriter;
pub use select::select_context;

// Re-export for convenience
pub use docqa_core::{RankingMode, RetrievedContext};
