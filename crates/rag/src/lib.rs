//! Retrieval for the helpdesk answer pipeline
//!
//! Features:
//! - Dense vector search via Qdrant (plus an in-memory store for tests
//!   and single-node deployments)
//! - Per-request BM25 lexical scoring with Japanese-aware tokenization
//! - Hybrid fusion by normalize-by-max weighted sum
//! - Optional cross-encoder reranking with graceful degradation
//! - Confidence gating: empty/low-confidence/contradiction/coverage checks

pub mod confidence;
pub mod embeddings;
pub mod lexical;
pub mod memory_store;
pub mod qdrant_store;
pub mod reranker;
pub mod retriever;
pub mod scorer;
pub mod tokenizer;

pub use confidence::ConfidenceGate;
pub use embeddings::OpenAIEmbedder;
pub use lexical::{Bm25Params, LexicalScorer};
pub use memory_store::InMemoryStore;
pub use qdrant_store::QdrantStore;
pub use reranker::Reranker;
pub use retriever::{HybridRetriever, RetrieverConfig};
pub use scorer::HttpRelevanceScorer;
pub use tokenizer::{Tokenizer, TokenizerMode};

use thiserror::Error;

/// Retrieval errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<helpdesk_core::Error> for RagError {
    fn from(err: helpdesk_core::Error) -> Self {
        match err {
            helpdesk_core::Error::Embedding(m) => RagError::Embedding(m),
            helpdesk_core::Error::Store(m) => RagError::Store(m),
            other => RagError::Search(other.to_string()),
        }
    }
}

impl From<RagError> for helpdesk_core::Error {
    fn from(err: RagError) -> Self {
        helpdesk_core::Error::Rag(err.to_string())
    }
}
