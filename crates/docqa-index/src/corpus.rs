//! The process-lifetime corpus and its lexical index.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use docqa_core::{Bm25Config, Chunk, ChunkId, QaError, RankedHit, Result};

use crate::bm25::LexicalIndex;

/// Immutable set of chunks plus the lexical index built over them.
///
/// Built once before serving queries and never mutated mid-process, so
/// concurrent searches need no coordination.
#[derive(Debug)]
pub struct Corpus {
    chunks: Vec<Arc<Chunk>>,
    by_id: HashMap<ChunkId, Arc<Chunk>>,
    index: LexicalIndex,
}

impl Corpus {
    /// Build the corpus and its lexical index.
    ///
    /// Chunks with identical content collapse to one entry (they share a
    /// canonical id). Fails with `QaError::EmptyCorpus` when no chunks are
    /// supplied.
    pub fn build(chunks: Vec<Chunk>, params: Bm25Config) -> Result<Self> {
        if chunks.is_empty() {
            return Err(QaError::EmptyCorpus);
        }

        let mut by_id: HashMap<ChunkId, Arc<Chunk>> = HashMap::new();
        let mut unique: Vec<Arc<Chunk>> = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            if by_id.contains_key(&chunk.id) {
                warn!("Duplicate chunk content, keeping first: {}", chunk.id);
                continue;
            }
            let chunk = Arc::new(chunk);
            by_id.insert(chunk.id, Arc::clone(&chunk));
            unique.push(chunk);
        }

        let index = LexicalIndex::build(&unique, params);

        info!("Corpus ready: {} chunks indexed", unique.len());

        Ok(Self {
            chunks: unique,
            by_id,
            index,
        })
    }

    /// Lexical BM25 search over the corpus.
    pub fn lexical_search(&self, query: &str, top_k: usize) -> Vec<RankedHit> {
        self.index.search(query, top_k)
    }

    /// Look up a chunk by its canonical id.
    pub fn get(&self, id: &ChunkId) -> Option<Arc<Chunk>> {
        self.by_id.get(id).cloned()
    }

    /// Number of distinct chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the corpus is empty (never true for a built corpus).
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All chunks in corpus order.
    pub fn chunks(&self) -> &[Arc<Chunk>] {
        &self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk::new("doc.pdf", 1, "S", vec!["S".into()], text)
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let err = Corpus::build(Vec::new(), Bm25Config::default()).unwrap_err();
        assert!(matches!(err, QaError::EmptyCorpus));
    }

    #[test]
    fn test_duplicate_content_collapses() {
        let corpus = Corpus::build(
            vec![chunk("same text"), chunk("same text"), chunk("other text")],
            Bm25Config::default(),
        )
        .unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_lookup_by_id() {
        let c = chunk("findable content");
        let id = c.id;
        let corpus = Corpus::build(vec![c], Bm25Config::default()).unwrap();

        assert!(corpus.get(&id).is_some());
        assert!(corpus.get(&ChunkId::from_content("missing")).is_none());
    }

    #[test]
    fn test_search_goes_through_index() {
        let corpus = Corpus::build(
            vec![chunk("premium payment terms"), chunk("claims procedure")],
            Bm25Config::default(),
        )
        .unwrap();

        let hits = corpus.lexical_search("premium", 10);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].chunk.full_content.contains("premium"));
    }
}
