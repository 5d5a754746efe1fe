//! The retrieval pipeline orchestrator.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use ulid::Ulid;

use docqa_core::{
    Embedder, FusedCandidate, QaConfig, RankedHit, RankingMode, RelevanceScorer, Result,
    RetrievedContext, RetryConfig, SearchConfig, TextGenerator, VectorIndex,
};
use docqa_index::Corpus;

use crate::fusion::reciprocal_rank_fusion;
use crate::rerank::{fusion_order_results, rerank_pool};
use crate::rewrite::QueryRewriter;
use crate::select::select_context;

/// The external capabilities the pipeline runs against.
pub struct PipelineServices {
    /// Text generation, for query rewriting.
    pub generator: Arc<dyn TextGenerator>,

    /// Query embedding.
    pub embedder: Arc<dyn Embedder>,

    /// External vector index.
    pub vector_index: Arc<dyn VectorIndex>,

    /// Pairwise relevance scoring.
    pub scorer: Arc<dyn RelevanceScorer>,
}

/// Hybrid retrieval pipeline: rewrite, search, fuse, rerank, select.
///
/// Owns the corpus, which is built before the pipeline serves its first
/// question -- an explicit startup phase rather than lazy initialization, so
/// concurrent first calls never race on index construction. All shared state
/// is read-only after construction.
pub struct RetrievalPipeline {
    corpus: Arc<Corpus>,
    rewriter: QueryRewriter,
    embedder: Arc<dyn Embedder>,
    vector_index: Arc<dyn VectorIndex>,
    scorer: Arc<dyn RelevanceScorer>,
    search: SearchConfig,
    retry: RetryConfig,
}

impl RetrievalPipeline {
    /// Create a pipeline over an already-built corpus.
    pub fn new(corpus: Corpus, services: PipelineServices, config: &QaConfig) -> Self {
        Self {
            corpus: Arc::new(corpus),
            rewriter: QueryRewriter::new(services.generator),
            embedder: services.embedder,
            vector_index: services.vector_index,
            scorer: services.scorer,
            search: config.search.clone(),
            retry: config.retry.clone(),
        }
    }

    /// The corpus this pipeline serves.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Retrieve the context window for a question.
    ///
    /// Sequences: rewrite (fail-open), embed, lexical + dense search in
    /// parallel, fuse, rerank the bounded pool, select the final passages.
    /// Embedding and vector-index failures are retried once with backoff and
    /// then surfaced; relevance-scoring failures degrade to the fusion
    /// ordering, tagged as `RankingMode::FusionOrder`.
    pub async fn retrieve_context(&self, question: &str) -> Result<RetrievedContext> {
        let start = Instant::now();
        let query_id = Ulid::new();

        info!(%query_id, "Retrieving context for: {:?}", question);

        let search_query = self.rewriter.rewrite(question).await;

        let embedding = self.embed_with_retry(&search_query).await?;

        // Independent reads against read-only state; overlap their latencies.
        let top_k = self.search.top_k;
        let (lexical, dense) = tokio::join!(
            async { self.corpus.lexical_search(&search_query, top_k) },
            self.dense_search(&embedding, top_k),
        );
        let dense = dense?;

        debug!(
            %query_id,
            "Lexical search returned {} hits, dense search returned {} hits",
            lexical.len(),
            dense.len()
        );

        let fused = reciprocal_rank_fusion(&lexical, &dense, self.search.rrf_k);
        let pool: Vec<FusedCandidate> = fused
            .into_iter()
            .take(self.search.rerank_pool_size())
            .collect();

        // Reranking scores against the original question, not the rewritten
        // query.
        let (results, mode) = match rerank_pool(self.scorer.as_ref(), question, &pool).await {
            Ok(results) => (results, RankingMode::Reranked),
            Err(err) => {
                warn!(%query_id, "Relevance scoring failed, returning fusion order: {}", err);
                (fusion_order_results(&pool), RankingMode::FusionOrder)
            }
        };

        let passages = select_context(&results, self.search.final_k);
        let latency_ms = start.elapsed().as_millis() as u64;

        info!(
            %query_id,
            mode = %mode,
            "Retrieved {} passages in {}ms",
            passages.len(),
            latency_ms
        );

        Ok(RetrievedContext {
            query_id,
            question: question.to_string(),
            search_query,
            passages,
            mode,
            latency_ms,
        })
    }

    /// Dense search: query the external index and resolve matches against
    /// the corpus.
    ///
    /// The match order is the ranking; matches whose id is unknown to the
    /// corpus are skipped, never an error.
    async fn dense_search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RankedHit>> {
        let matches = self.vector_query_with_retry(embedding, top_k).await?;

        let mut hits = Vec::with_capacity(matches.len());
        for m in matches {
            match self.corpus.get(&m.chunk_id) {
                Some(chunk) => {
                    let rank = hits.len();
                    hits.push(RankedHit {
                        chunk,
                        raw_score: m.score,
                        rank,
                    });
                }
                None => debug!("Vector match {} not in corpus, skipping", m.chunk_id),
            }
        }

        Ok(hits)
    }

    async fn embed_with_retry(&self, text: &str) -> Result<Vec<f32>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.embedder.embed_query(text).await {
                Ok(vector) => return Ok(vector),
                Err(err) if attempt < self.retry.attempts => {
                    warn!(attempt, "Embedding call failed, retrying: {}", err);
                    tokio::time::sleep(self.retry.backoff()).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn vector_query_with_retry(
        &self,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<docqa_core::VectorMatch>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.vector_index.query(embedding, top_k).await {
                Ok(matches) => return Ok(matches),
                Err(err) if attempt < self.retry.attempts => {
                    warn!(attempt, "Vector index call failed, retrying: {}", err);
                    tokio::time::sleep(self.retry.backoff()).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
