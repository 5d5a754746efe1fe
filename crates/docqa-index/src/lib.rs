//! docqa-index - Lexical indexing for docqa
//!
//! This crate provides the tokenizer, the in-memory BM25 inverted index, and
//! the process-lifetime corpus built from ingested chunks.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_index::Corpus;
//! use docqa_core::Bm25Config;
//!
//! let corpus = Corpus::build(chunks, Bm25Config::default())?;
//! let hits = corpus.lexical_search("grace period", 10);
//! ```

mod bm25;
mod corpus;
mod tokenize;

pub use bm25::LexicalIndex;
pub use corpus::Corpus;
pub use tokenize::tokenize;
