//! Error types for the retrieval pipeline.

use thiserror::Error;

/// Result type alias using QaError.
pub type Result<T> = std::result::Result<T, QaError>;

/// Errors that can occur in the retrieval pipeline.
#[derive(Error, Debug)]
pub enum QaError {
    /// No chunks were available at index-build time.
    #[error("Nothing indexed: the corpus contains no chunks")]
    EmptyCorpus,

    /// Invalid argument provided.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Embedding service call failed.
    #[error("Embedding error: {message}")]
    Embedding { message: String },

    /// Vector index service call failed.
    #[error("Vector index error: {message}")]
    VectorIndex { message: String },

    /// Relevance scoring service call failed.
    #[error("Rerank error: {message}")]
    Rerank { message: String },

    /// Text generation service call failed.
    #[error("Generation error: {message}")]
    Generation { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Internal error (unexpected).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl QaError {
    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an embedding error.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding {
            message: message.into(),
        }
    }

    /// Create a vector index error.
    pub fn vector_index(message: impl Into<String>) -> Self {
        Self::VectorIndex {
            message: message.into(),
        }
    }

    /// Create a rerank error.
    pub fn rerank(message: impl Into<String>) -> Self {
        Self::Rerank {
            message: message.into(),
        }
    }

    /// Create a generation error.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the error code for structured responses to the caller.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyCorpus => "EMPTY_CORPUS",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Embedding { .. } => "EMBEDDING_ERROR",
            Self::VectorIndex { .. } => "VECTOR_INDEX_ERROR",
            Self::Rerank { .. } => "RERANK_ERROR",
            Self::Generation { .. } => "GENERATION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Whether the error came from a retrieval-critical external service
    /// (embedding or vector index) and is worth one retry with backoff.
    pub fn is_retrieval_service_error(&self) -> bool {
        matches!(self, Self::Embedding { .. } | Self::VectorIndex { .. })
    }
}
