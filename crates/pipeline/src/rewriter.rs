//! Query rewriting
//!
//! Turns the raw question into a search-optimized query through one
//! low-temperature generation call. Fail-open: a degraded rewrite is
//! strictly no worse than none, so every failure path returns the
//! original question and never surfaces an error.

use std::sync::Arc;

use helpdesk_config::{GenerationBudget, LlmSettings};
use helpdesk_core::Query;
use helpdesk_llm::{prompt, LlmBackend};

/// Longest rewrite accepted before falling back to the original
const MAX_REWRITE_CHARS: usize = 500;

/// LLM-backed query rewriter
pub struct QueryRewriter {
    llm: Arc<dyn LlmBackend>,
    budget: GenerationBudget,
}

impl QueryRewriter {
    pub fn new(llm: Arc<dyn LlmBackend>, settings: &LlmSettings) -> Self {
        Self {
            llm,
            budget: settings.rewrite,
        }
    }

    /// Rewrite the question for retrieval.
    ///
    /// The result is the first non-empty line of the completion, trimmed.
    /// Backend failures, empty output and oversized output all fall back
    /// to the original question.
    pub async fn rewrite(&self, question: &str) -> Query {
        let messages = prompt::rewrite_prompt(question);

        match self.llm.generate(&messages, self.budget).await {
            Ok(result) => {
                let line = result
                    .text
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .unwrap_or("")
                    .to_string();

                if line.is_empty() || line.chars().count() > MAX_REWRITE_CHARS {
                    tracing::debug!("rewrite output unusable, keeping original question");
                    Query::verbatim(question)
                } else {
                    tracing::debug!(original = question, rewritten = %line, "query rewritten");
                    Query::rewritten(question, line)
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "query rewriting failed, using original question");
                Query::verbatim(question)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use helpdesk_llm::{GenerationResult, LlmError, Message};

    struct FixedLlm(String);

    #[async_trait]
    impl LlmBackend for FixedLlm {
        async fn generate(
            &self,
            _messages: &[Message],
            _budget: GenerationBudget,
        ) -> Result<GenerationResult, LlmError> {
            Ok(GenerationResult {
                text: self.0.clone(),
                tokens: None,
                total_time_ms: 1,
            })
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    struct DownLlm;

    #[async_trait]
    impl LlmBackend for DownLlm {
        async fn generate(
            &self,
            _messages: &[Message],
            _budget: GenerationBudget,
        ) -> Result<GenerationResult, LlmError> {
            Err(LlmError::Timeout)
        }

        async fn is_available(&self) -> bool {
            false
        }

        fn model_name(&self) -> &str {
            "down"
        }
    }

    fn settings() -> LlmSettings {
        LlmSettings::default()
    }

    #[tokio::test]
    async fn test_rewrite_takes_first_line_trimmed() {
        let rewriter = QueryRewriter::new(
            Arc::new(FixedLlm("  利用単位とは何ですか  \n補足行".to_string())),
            &settings(),
        );
        let query = rewriter.rewrite("利単って何？").await;
        assert_eq!(query.original, "利単って何？");
        assert_eq!(query.rewritten, "利用単位とは何ですか");
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_original() {
        let rewriter = QueryRewriter::new(Arc::new(DownLlm), &settings());
        let query = rewriter.rewrite("利単って何？").await;
        assert_eq!(query.rewritten, "利単って何？");
    }

    #[tokio::test]
    async fn test_empty_output_falls_back_to_original() {
        let rewriter = QueryRewriter::new(Arc::new(FixedLlm("\n \n".to_string())), &settings());
        let query = rewriter.rewrite("質問").await;
        assert_eq!(query.rewritten, "質問");
    }

    #[tokio::test]
    async fn test_oversized_output_falls_back_to_original() {
        let rewriter = QueryRewriter::new(
            Arc::new(FixedLlm("あ".repeat(600))),
            &settings(),
        );
        let query = rewriter.rewrite("質問").await;
        assert_eq!(query.rewritten, "質問");
    }
}
