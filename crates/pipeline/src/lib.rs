//! Answer pipeline orchestration
//!
//! Sequences query rewriting, hybrid retrieval, reranking, confidence
//! gating, the guideline fallback and answer synthesis into one
//! request → `ChatResult` transformation. Every path terminates in a
//! well-formed result; failures route through the last-resort error
//! fallback instead of reaching the caller.

pub mod orchestrator;
pub mod rewriter;
pub mod synthesizer;

pub use orchestrator::{AnswerPipeline, PipelineBuilder, PipelineStage};
pub use rewriter::QueryRewriter;
pub use synthesizer::{AnswerSynthesizer, SynthesizedAnswer};

use thiserror::Error;

/// Pipeline errors. These never escape `AnswerPipeline::chat`; they exist
/// to route mid-pipeline failures into the error fallback.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] helpdesk_rag::RagError),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<helpdesk_llm::LlmError> for PipelineError {
    fn from(err: helpdesk_llm::LlmError) -> Self {
        PipelineError::Generation(err.to_string())
    }
}

impl From<PipelineError> for helpdesk_core::Error {
    fn from(err: PipelineError) -> Self {
        helpdesk_core::Error::Pipeline(err.to_string())
    }
}
