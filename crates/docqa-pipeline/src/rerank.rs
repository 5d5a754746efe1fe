//! Pairwise reranking of the fused candidate pool.

use docqa_core::{FusedCandidate, RelevanceScorer, RerankedResult, Result};

/// Rerank a bounded pool of fused candidates against the original question.
///
/// One `score_pairs` call covers the whole pool; the output is the same set
/// of candidates sorted by relevance descending, ties keeping fusion order
/// (the sort is stable). An empty pool returns an empty list without
/// invoking the external model.
pub async fn rerank_pool(
    scorer: &dyn RelevanceScorer,
    question: &str,
    pool: &[FusedCandidate],
) -> Result<Vec<RerankedResult>> {
    if pool.is_empty() {
        return Ok(Vec::new());
    }

    let passages: Vec<&str> = pool.iter().map(|c| c.chunk.full_content.as_str()).collect();
    let scores = scorer.score_pairs(question, &passages).await?;

    let mut results: Vec<RerankedResult> = pool
        .iter()
        .zip(scores)
        .map(|(candidate, relevance_score)| RerankedResult {
            chunk: std::sync::Arc::clone(&candidate.chunk),
            relevance_score,
        })
        .collect();

    results.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(results)
}

/// Fall back to the fusion ordering when relevance scoring is unavailable.
///
/// The fused score stands in for the relevance score; callers distinguish
/// this degraded path through `RankingMode::FusionOrder`.
pub fn fusion_order_results(pool: &[FusedCandidate]) -> Vec<RerankedResult> {
    pool.iter()
        .map(|candidate| RerankedResult {
            chunk: std::sync::Arc::clone(&candidate.chunk),
            relevance_score: candidate.fused_score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use docqa_core::{Chunk, ChunkId, QaError};
    use std::collections::HashMap;
    use std::sync::Arc;

    struct TableScorer(HashMap<String, f32>);

    #[async_trait]
    impl RelevanceScorer for TableScorer {
        async fn score_pairs(&self, _question: &str, passages: &[&str]) -> Result<Vec<f32>> {
            Ok(passages
                .iter()
                .map(|p| self.0.get(*p).copied().unwrap_or(0.0))
                .collect())
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl RelevanceScorer for FailingScorer {
        async fn score_pairs(&self, _question: &str, _passages: &[&str]) -> Result<Vec<f32>> {
            Err(QaError::rerank("down"))
        }
    }

    fn candidate(text: &str, fused_score: f32) -> FusedCandidate {
        FusedCandidate {
            chunk: Arc::new(Chunk::new("doc.pdf", 1, "S", vec!["S".into()], text)),
            fused_score,
        }
    }

    #[tokio::test]
    async fn test_sorted_by_relevance_descending() {
        let pool = vec![candidate("low", 0.9), candidate("high", 0.8)];
        let scorer = TableScorer(
            [("low".to_string(), 0.1), ("high".to_string(), 0.95)]
                .into_iter()
                .collect(),
        );

        let results = rerank_pool(&scorer, "q", &pool).await.unwrap();
        assert_eq!(results[0].chunk.full_content, "high");
        assert_eq!(results[1].chunk.full_content, "low");
    }

    #[tokio::test]
    async fn test_output_is_permutation_of_pool() {
        let pool = vec![candidate("a", 0.3), candidate("b", 0.2), candidate("c", 0.1)];
        let scorer = TableScorer(
            [
                ("a".to_string(), 0.5),
                ("b".to_string(), 0.9),
                ("c".to_string(), 0.7),
            ]
            .into_iter()
            .collect(),
        );

        let results = rerank_pool(&scorer, "q", &pool).await.unwrap();
        assert_eq!(results.len(), pool.len());

        let mut pool_ids: Vec<ChunkId> = pool.iter().map(FusedCandidate::chunk_id).collect();
        let mut result_ids: Vec<ChunkId> = results.iter().map(|r| r.chunk.id).collect();
        pool_ids.sort();
        result_ids.sort();
        assert_eq!(pool_ids, result_ids);
    }

    #[tokio::test]
    async fn test_ties_keep_fusion_order() {
        let pool = vec![candidate("first", 0.9), candidate("second", 0.8)];
        let scorer = TableScorer(
            [("first".to_string(), 0.5), ("second".to_string(), 0.5)]
                .into_iter()
                .collect(),
        );

        let results = rerank_pool(&scorer, "q", &pool).await.unwrap();
        assert_eq!(results[0].chunk.full_content, "first");
        assert_eq!(results[1].chunk.full_content, "second");
    }

    #[tokio::test]
    async fn test_empty_pool_skips_the_model() {
        // FailingScorer would error if invoked
        let results = rerank_pool(&FailingScorer, "q", &[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_fusion_order_fallback_preserves_order() {
        let pool = vec![candidate("a", 0.9), candidate("b", 0.5), candidate("c", 0.2)];
        let results = fusion_order_results(&pool);

        let order: Vec<&str> = results.iter().map(|r| r.chunk.full_content.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!((results[0].relevance_score - 0.9).abs() < 1e-6);
    }
}
