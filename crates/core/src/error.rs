//! Workspace-wide error type
//!
//! Each crate defines its own `thiserror` enum and converts into this type
//! at the crate boundary.

use thiserror::Error;

/// Top-level error for the helpdesk pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Retrieval error: {0}")]
    Rag(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;
