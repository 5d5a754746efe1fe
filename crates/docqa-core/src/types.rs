//! Core domain types for the retrieval pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::{QaError, Result};

/// Canonical chunk identity: blake3 hash of the chunk's full content.
///
/// Both retrieval methods (lexical and dense) must report hits under this
/// identity so fusion can collapse duplicate hits into a single candidate.
/// The vector index stores the hex encoding of this hash as its record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId([u8; 32]);

impl ChunkId {
    /// Derive the canonical id from chunk content.
    pub fn from_content(content: &str) -> Self {
        Self(*blake3::hash(content.as_bytes()).as_bytes())
    }

    /// Full hex encoding, used as the vector index record id.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a full hex encoding back into an id.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| QaError::invalid_argument(format!("invalid chunk id hex: {}", e)))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| QaError::invalid_argument("invalid chunk id length"))?;
        Ok(Self(arr))
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short prefix is enough for logs.
        write!(f, "{}", &self.to_hex()[..12])
    }
}

impl std::str::FromStr for ChunkId {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for ChunkId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ChunkId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// An immutable unit of retrievable text with its source metadata.
///
/// Produced by the ingestion collaborator; the retrieval core treats it as
/// read-only input, loaded once per corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Canonical identity, derived from `full_content`.
    pub id: ChunkId,

    /// Source document file name.
    pub document_name: String,

    /// Page number in the source document.
    pub page_number: u32,

    /// Title of the section this chunk came from.
    pub section_title: String,

    /// Ordered ancestor section titles, outermost first (includes own title).
    pub hierarchy_path: Vec<String>,

    /// The text that is actually scored and embedded.
    pub full_content: String,
}

impl Chunk {
    /// Create a chunk from already-assembled content.
    pub fn new(
        document_name: &str,
        page_number: u32,
        section_title: &str,
        hierarchy_path: Vec<String>,
        full_content: &str,
    ) -> Self {
        Self {
            id: ChunkId::from_content(full_content),
            document_name: document_name.to_string(),
            page_number,
            section_title: section_title.to_string(),
            hierarchy_path,
            full_content: full_content.to_string(),
        }
    }

    /// Create a chunk from a parsed section, assembling `full_content` as
    /// the hierarchy path joined with " > " followed by the body text.
    pub fn from_section(
        document_name: &str,
        page_number: u32,
        section_title: &str,
        hierarchy_path: Vec<String>,
        body: &str,
    ) -> Self {
        let full_content = format!("{}: {}", hierarchy_path.join(" > "), body);
        Self::new(
            document_name,
            page_number,
            section_title,
            hierarchy_path,
            &full_content,
        )
    }
}

/// A hit from one retrieval method (lexical or dense).
///
/// Raw scores are method-specific and not comparable across methods; only the
/// rank participates in fusion.
#[derive(Debug, Clone)]
pub struct RankedHit {
    /// The matched chunk.
    pub chunk: Arc<Chunk>,

    /// Method-specific score (BM25 or vector similarity).
    pub raw_score: f32,

    /// 0-based position in the method's own result list.
    pub rank: usize,
}

impl RankedHit {
    /// Canonical identity of the matched chunk.
    pub fn chunk_id(&self) -> ChunkId {
        self.chunk.id
    }
}

/// A match returned by the external vector index, most-similar first.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    /// Canonical chunk id recorded at ingestion time.
    pub chunk_id: ChunkId,

    /// Similarity score (semantics owned by the index service).
    pub score: f32,
}

/// One candidate in the fused ranking.
///
/// Exactly one candidate exists per distinct chunk identity across both input
/// lists; its score is the sum of the reciprocal-rank contributions.
#[derive(Debug, Clone)]
pub struct FusedCandidate {
    /// The candidate chunk.
    pub chunk: Arc<Chunk>,

    /// Sum of reciprocal-rank contributions.
    pub fused_score: f32,
}

impl FusedCandidate {
    /// Canonical identity of the candidate chunk.
    pub fn chunk_id(&self) -> ChunkId {
        self.chunk.id
    }
}

/// One entry in the reranked ordering.
#[derive(Debug, Clone)]
pub struct RerankedResult {
    /// The scored chunk.
    pub chunk: Arc<Chunk>,

    /// Model-assigned relevance, comparable only within one reranking call.
    pub relevance_score: f32,
}

/// How the final ordering was produced.
///
/// `FusionOrder` marks a degraded response: the relevance scorer failed and
/// the pipeline fell back to the fusion ranking rather than failing the
/// whole request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingMode {
    /// Ordered by the pairwise relevance model.
    Reranked,

    /// Relevance scoring unavailable; fusion order preserved.
    FusionOrder,
}

impl std::fmt::Display for RankingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reranked => write!(f, "reranked"),
            Self::FusionOrder => write!(f, "fusion-order"),
        }
    }
}

/// The pipeline's final output: the context window handed to generation.
#[derive(Debug, Clone)]
pub struct RetrievedContext {
    /// Per-question trace identifier.
    pub query_id: Ulid,

    /// The original question.
    pub question: String,

    /// The query actually used for retrieval (rewritten, or the original on
    /// rewrite failure).
    pub search_query: String,

    /// Final passages, highest relevance first.
    pub passages: Vec<String>,

    /// Whether the ordering came from the reranker or the fusion fallback.
    pub mode: RankingMode,

    /// End-to-end latency in milliseconds.
    pub latency_ms: u64,
}
