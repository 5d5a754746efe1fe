//! Final context selection.

use docqa_core::RerankedResult;

/// Truncate the reranked list to the top `final_k` passage contents.
///
/// Pure truncation: order is unchanged, and a list shorter than `final_k`
/// is returned whole. This is the only output handed onward to generation.
pub fn select_context(results: &[RerankedResult], final_k: usize) -> Vec<String> {
    results
        .iter()
        .take(final_k)
        .map(|r| r.chunk.full_content.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::Chunk;
    use std::sync::Arc;

    fn result(text: &str, score: f32) -> RerankedResult {
        RerankedResult {
            chunk: Arc::new(Chunk::new("doc.pdf", 1, "S", vec!["S".into()], text)),
            relevance_score: score,
        }
    }

    #[test]
    fn test_truncates_to_final_k() {
        let results = vec![
            result("a", 0.9),
            result("b", 0.8),
            result("c", 0.7),
            result("d", 0.6),
            result("e", 0.5),
        ];

        let selected = select_context(&results, 3);
        assert_eq!(selected, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_short_list_returned_whole() {
        let results = vec![result("a", 0.9), result("b", 0.8)];
        let selected = select_context(&results, 3);
        assert_eq!(selected, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(select_context(&[], 3).is_empty());
    }
}
