//! Query rewriting via the text generation service.

use std::sync::Arc;

use tracing::{debug, warn};

use docqa_core::TextGenerator;

/// Instruction for expanding a question into a search-optimized query.
const REWRITE_PROMPT: &str = "\
You are an expert at rewriting user questions to be more effective for a vector database search.
Your task is to take the user's question and expand it into a more descriptive, detailed query that contains more contextual keywords.
Do not answer the question. Only provide the rewritten query.

Original Question: {question}

Rewritten Query:";

/// Expands raw questions into keyword-dense search queries.
///
/// Rewriting is a quality enhancement, never a hard dependency: on any
/// generation failure (or an empty response) the original question is used
/// unchanged. This is the only pipeline stage permitted to fail open.
pub struct QueryRewriter {
    generator: Arc<dyn TextGenerator>,
}

impl QueryRewriter {
    /// Create a new rewriter over the given generator.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Rewrite the question, falling back to the original on failure.
    pub async fn rewrite(&self, question: &str) -> String {
        let prompt = REWRITE_PROMPT.replace("{question}", question);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let rewritten = text.trim();
                if rewritten.is_empty() {
                    warn!("Rewrite returned empty text, using original question");
                    question.to_string()
                } else {
                    debug!("Rewrote query: {:?} -> {:?}", question, rewritten);
                    rewritten.to_string()
                }
            }
            Err(err) => {
                warn!("Rewrite unavailable, using original question: {}", err);
                question.to_string()
            }
        }
    }
}
