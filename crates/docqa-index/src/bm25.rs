//! In-memory BM25 lexical index.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use docqa_core::{Bm25Config, Chunk, RankedHit};

use crate::tokenize::tokenize;

/// One entry in a term's posting list.
#[derive(Debug, Clone, Copy)]
struct Posting {
    /// Position of the chunk in corpus order.
    chunk: u32,

    /// Occurrences of the term in that chunk.
    term_freq: u32,
}

/// Inverted index over the corpus with BM25 scoring.
///
/// Built once from the full corpus and never mutated; searches are read-only
/// and safe to run concurrently.
#[derive(Debug)]
pub struct LexicalIndex {
    chunks: Vec<Arc<Chunk>>,
    postings: HashMap<String, Vec<Posting>>,
    doc_lengths: Vec<u32>,
    avg_doc_len: f32,
    params: Bm25Config,
}

impl LexicalIndex {
    /// Build the index over the given chunks, in corpus order.
    pub fn build(chunks: &[Arc<Chunk>], params: Bm25Config) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(chunks.len());

        for (pos, chunk) in chunks.iter().enumerate() {
            let tokens = tokenize(&chunk.full_content);
            doc_lengths.push(tokens.len() as u32);

            let mut term_freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *term_freqs.entry(token).or_insert(0) += 1;
            }

            for (term, term_freq) in term_freqs {
                postings.entry(term).or_default().push(Posting {
                    chunk: pos as u32,
                    term_freq,
                });
            }
        }

        let total_len: u64 = doc_lengths.iter().map(|&l| u64::from(l)).sum();
        let avg_doc_len = if doc_lengths.is_empty() {
            0.0
        } else {
            total_len as f32 / doc_lengths.len() as f32
        };

        debug!(
            "Built lexical index: {} chunks, {} distinct terms, avg length {:.1}",
            chunks.len(),
            postings.len(),
            avg_doc_len
        );

        Self {
            chunks: chunks.to_vec(),
            postings,
            doc_lengths,
            avg_doc_len,
            params,
        }
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// BM25 score of one chunk against the query terms.
    ///
    /// Terms absent from the index contribute zero.
    fn score_terms(&self, terms: &[String]) -> HashMap<u32, f32> {
        let n = self.chunks.len() as f32;
        let mut scores: HashMap<u32, f32> = HashMap::new();

        for term in terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };

            let df = postings.len() as f32;
            let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();

            for posting in postings {
                let tf = posting.term_freq as f32;
                let doc_len = self.doc_lengths[posting.chunk as usize] as f32;
                let norm = 1.0 - self.params.b + self.params.b * doc_len / self.avg_doc_len;
                let score = idf * (tf * (self.params.k1 + 1.0)) / (tf + self.params.k1 * norm);

                *scores.entry(posting.chunk).or_insert(0.0) += score;
            }
        }

        scores
    }

    /// Return the `top_k` highest-scoring chunks for the query, descending.
    ///
    /// Ties break by corpus order. A query that tokenizes to nothing returns
    /// an empty list, never an error.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<RankedHit> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(u32, f32)> = self
            .score_terms(&terms)
            .into_iter()
            .filter(|&(_, score)| score > 0.0)
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);

        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (pos, raw_score))| RankedHit {
                chunk: Arc::clone(&self.chunks[pos as usize]),
                raw_score,
                rank,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Arc<Chunk> {
        Arc::new(Chunk::new("doc.pdf", 1, "S", vec!["S".into()], text))
    }

    fn build(texts: &[&str]) -> LexicalIndex {
        let chunks: Vec<Arc<Chunk>> = texts.iter().map(|t| chunk(t)).collect();
        LexicalIndex::build(&chunks, Bm25Config::default())
    }

    #[test]
    fn test_exact_term_match_ranks_first() {
        let index = build(&[
            "the premium is payable monthly",
            "grace period of thirty days applies",
            "the waiting period for maternity benefits",
        ]);

        let hits = index.search("grace period", 10);
        assert!(!hits.is_empty());
        assert!(hits[0].chunk.full_content.contains("grace period"));
    }

    #[test]
    fn test_results_sorted_descending_with_ranks() {
        let index = build(&[
            "alpha beta gamma",
            "alpha alpha beta",
            "delta epsilon",
            "alpha beta beta beta",
        ]);

        let hits = index.search("alpha beta", 10);
        for window in hits.windows(2) {
            assert!(window[0].raw_score >= window[1].raw_score);
        }
        for (i, hit) in hits.iter().enumerate() {
            assert_eq!(hit.rank, i);
        }
    }

    #[test]
    fn test_at_most_top_k() {
        let index = build(&["word x", "word y", "word z", "word w", "word v"]);
        let hits = index.search("word", 3);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let index = build(&["some content here"]);
        assert!(index.search("", 10).is_empty());
        assert!(index.search("!!! ...", 10).is_empty());
    }

    #[test]
    fn test_unknown_terms_contribute_zero() {
        let index = build(&["alpha beta", "gamma delta"]);
        let hits = index.search("zeppelin", 10);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_ties_break_by_corpus_order() {
        // Equal length and term frequency score identically; corpus order decides.
        let index = build(&["same words here", "same words also", "other things"]);
        let hits = index.search("same", 10);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].raw_score >= hits[1].raw_score);
        // First corpus position wins the tie
        assert!(hits[0].chunk.full_content.ends_with("here"));
    }

    #[test]
    fn test_idf_formula() {
        // One doc of three contains the term: idf = ln(1 + (3 - 1 + 0.5) / (1 + 0.5))
        let index = build(&["unique term", "filler text", "more filler"]);
        let hits = index.search("unique", 10);
        assert_eq!(hits.len(), 1);

        let n = 3.0f32;
        let df = 1.0f32;
        let idf = (1.0 + (n - df + 0.5) / (df + 0.5)).ln();
        let tf = 1.0f32;
        let k1 = 1.5f32;
        let b = 0.75f32;
        let doc_len = 2.0f32;
        let avg = (2.0 + 2.0 + 2.0) / 3.0;
        let expected = idf * (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * doc_len / avg));

        assert!((hits[0].raw_score - expected).abs() < 1e-5);
    }

    #[test]
    fn test_tokenization_matches_index_and_query() {
        // Mixed case and punctuation in the query must still match.
        let index = build(&["The Grace-Period lasts thirty days."]);
        let hits = index.search("GRACE period", 10);
        assert_eq!(hits.len(), 1);
    }
}
