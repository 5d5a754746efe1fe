//! Reciprocal Rank Fusion (RRF) for combining search results.

use std::collections::HashMap;
use std::sync::Arc;

use docqa_core::{ChunkId, FusedCandidate, RankedHit};

/// Fuse the lexical and dense result lists using Reciprocal Rank Fusion.
///
/// Each hit at 0-based rank `r` contributes `1 / (k + r + 1)` to the fused
/// score of its canonical chunk identity. A chunk appearing in both lists
/// accumulates both contributions; a chunk in only one list participates with
/// that contribution alone. The output is sorted by fused score descending,
/// with exactly one candidate per distinct chunk identity. Ties keep
/// first-appearance order (lexical list first), so the ordering is
/// deterministic.
///
/// RRF scores are only meaningful as an ordering within one query; no
/// normalization across queries is performed. Rank-based fusion is used
/// because BM25 scores and vector similarities live on incomparable scales.
pub fn reciprocal_rank_fusion(
    lexical: &[RankedHit],
    dense: &[RankedHit],
    k: u32,
) -> Vec<FusedCandidate> {
    let k = k as f32;
    let mut by_id: HashMap<ChunkId, usize> = HashMap::new();
    let mut candidates: Vec<FusedCandidate> = Vec::new();

    for hit in lexical.iter().chain(dense.iter()) {
        let contribution = 1.0 / (k + hit.rank as f32 + 1.0);
        match by_id.get(&hit.chunk_id()) {
            Some(&idx) => candidates[idx].fused_score += contribution,
            None => {
                by_id.insert(hit.chunk_id(), candidates.len());
                candidates.push(FusedCandidate {
                    chunk: Arc::clone(&hit.chunk),
                    fused_score: contribution,
                });
            }
        }
    }

    // Stable sort keeps first-appearance order for equal scores
    candidates.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::Chunk;

    fn hit(text: &str, rank: usize) -> RankedHit {
        RankedHit {
            chunk: Arc::new(Chunk::new("doc.pdf", 1, "S", vec!["S".into()], text)),
            raw_score: 1.0 / (rank + 1) as f32,
            rank,
        }
    }

    fn hits(texts: &[&str]) -> Vec<RankedHit> {
        texts.iter().enumerate().map(|(r, t)| hit(t, r)).collect()
    }

    #[test]
    fn test_single_list_contribution() {
        let lexical = hits(&["a", "b", "c"]);
        let fused = reciprocal_rank_fusion(&lexical, &[], 60);

        assert_eq!(fused.len(), 3);
        assert!((fused[0].fused_score - 1.0 / 61.0).abs() < 1e-6);
        assert!((fused[1].fused_score - 1.0 / 62.0).abs() < 1e-6);
        assert!((fused[2].fused_score - 1.0 / 63.0).abs() < 1e-6);
    }

    #[test]
    fn test_both_lists_accumulate() {
        // "b" at lexical rank 1 and dense rank 0
        let lexical = hits(&["a", "b"]);
        let dense = hits(&["b", "c"]);
        let fused = reciprocal_rank_fusion(&lexical, &dense, 60);

        let b = fused
            .iter()
            .find(|c| c.chunk.full_content == "b")
            .unwrap();
        assert!((b.fused_score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-6);
    }

    #[test]
    fn test_no_duplicate_identities() {
        let lexical = hits(&["a", "b", "c"]);
        let dense = hits(&["c", "b", "a"]);
        let fused = reciprocal_rank_fusion(&lexical, &dense, 60);

        assert_eq!(fused.len(), 3);
        let mut ids: Vec<ChunkId> = fused.iter().map(FusedCandidate::chunk_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_sorted_descending() {
        let lexical = hits(&["a", "b", "c", "d"]);
        let dense = hits(&["d", "c"]);
        let fused = reciprocal_rank_fusion(&lexical, &dense, 60);

        for window in fused.windows(2) {
            assert!(window[0].fused_score >= window[1].fused_score);
        }
    }

    #[test]
    fn test_corpus_scenario() {
        // lexical [A, B, C], dense [B, D, A]; expected order (k=60):
        // B (1/61 + 1/62) > A (1/61 + 1/63) > D (1/62) > C (1/63)
        let lexical = hits(&["A", "B", "C"]);
        let dense = hits(&["B", "D", "A"]);
        let fused = reciprocal_rank_fusion(&lexical, &dense, 60);

        let order: Vec<&str> = fused.iter().map(|c| c.chunk.full_content.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "D", "C"]);

        assert!((fused[0].fused_score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-6);
        assert!((fused[1].fused_score - (1.0 / 61.0 + 1.0 / 63.0)).abs() < 1e-6);
        assert!((fused[2].fused_score - 1.0 / 62.0).abs() < 1e-6);
        assert!((fused[3].fused_score - 1.0 / 63.0).abs() < 1e-6);
    }

    #[test]
    fn test_one_empty_list_still_fuses() {
        let lexical = hits(&["a", "b", "c"]);
        let fused = reciprocal_rank_fusion(&lexical, &[], 60);
        assert_eq!(fused.len(), 3);

        let fused = reciprocal_rank_fusion(&[], &[], 60);
        assert!(fused.is_empty());
    }
}
