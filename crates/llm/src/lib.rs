//! Text generation for the helpdesk pipeline
//!
//! One `LlmBackend` instance serves both query rewriting and answer
//! synthesis; callers pass a per-call `GenerationBudget` so the rewrite
//! path stays cheap and deterministic while synthesis gets a moderate
//! token budget.

pub mod backend;
pub mod openai;
pub mod prompt;

pub use backend::{GenerationResult, LlmBackend};
pub use openai::OpenAIBackend;
pub use prompt::{Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for helpdesk_core::Error {
    fn from(err: LlmError) -> Self {
        helpdesk_core::Error::Llm(err.to_string())
    }
}
