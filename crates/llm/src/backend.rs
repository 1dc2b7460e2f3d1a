//! LLM backend trait

use async_trait::async_trait;

use helpdesk_config::GenerationBudget;

use crate::prompt::Message;
use crate::LlmError;

/// Generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Completion tokens reported by the backend, if any
    pub tokens: Option<usize>,
    /// Total wall time (ms)
    pub total_time_ms: u64,
}

/// Text-generation backend.
///
/// Implementations are read-only handles, safe for concurrent use by
/// multiple in-flight requests. Calls are bounded by the backend's
/// configured timeout and are never retried; timeouts surface as
/// `LlmError::Timeout` and the caller applies its documented fallback.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a completion for the given messages
    async fn generate(
        &self,
        messages: &[Message],
        budget: GenerationBudget,
    ) -> Result<GenerationResult, LlmError>;

    /// Check if the backend is reachable
    async fn is_available(&self) -> bool;

    /// Model name
    fn model_name(&self) -> &str;
}
