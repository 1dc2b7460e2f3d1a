//! Answer synthesis
//!
//! Composes the final answer from the selected top documents: one
//! generation call grounded strictly in their contents, plus a trailing
//! attribution line built from each document's source metadata. With no
//! documents at all, synthesis short-circuits to the fixed not-found
//! message without calling the model.

use std::sync::Arc;

use helpdesk_config::constants::messages;
use helpdesk_config::{GenerationBudget, LlmSettings};
use helpdesk_core::ScoredDocument;
use helpdesk_llm::{prompt, LlmBackend};

use crate::PipelineError;

/// Synthesis output: answer text plus the citations that back it
#[derive(Debug, Clone)]
pub struct SynthesizedAnswer {
    /// Final answer including the attribution line
    pub text: String,
    /// Citation strings in rank order, `source(type)` form
    pub sources: Vec<String>,
    /// Number of documents whose content fed the generation
    pub cited_documents: usize,
}

impl SynthesizedAnswer {
    fn not_found() -> Self {
        Self {
            text: messages::NOT_FOUND.to_string(),
            sources: Vec::new(),
            cited_documents: 0,
        }
    }
}

/// LLM-backed answer synthesizer
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmBackend>,
    budget: GenerationBudget,
    top_n: usize,
}

impl AnswerSynthesizer {
    pub fn new(llm: Arc<dyn LlmBackend>, settings: &LlmSettings, top_n: usize) -> Self {
        Self {
            llm,
            budget: settings.answer,
            top_n,
        }
    }

    /// Generate an answer from the top documents.
    ///
    /// Generation failures bubble up so the orchestrator can route the
    /// request through the error fallback.
    pub async fn synthesize(
        &self,
        question: &str,
        documents: &[ScoredDocument],
    ) -> Result<SynthesizedAnswer, PipelineError> {
        if documents.is_empty() {
            return Ok(SynthesizedAnswer::not_found());
        }

        let top: Vec<&ScoredDocument> = documents.iter().take(self.top_n).collect();

        let combined = top
            .iter()
            .map(|d| d.document.content.as_str())
            .collect::<Vec<_>>()
            .join(messages::DOCUMENT_SEPARATOR);

        let sources: Vec<String> = top
            .iter()
            .filter_map(|d| {
                d.document
                    .source()
                    .map(|s| format!("{}({})", s, d.document.doc_type))
            })
            .collect();

        let generation = self
            .llm
            .generate(&prompt::answer_prompt(&combined, question), self.budget)
            .await?;

        let attribution = if sources.is_empty() {
            messages::DEFAULT_SOURCE.to_string()
        } else {
            sources.join(messages::SOURCE_SEPARATOR)
        };

        let text = format!(
            "{}\n\n{}{}{}",
            generation.text.trim(),
            messages::CITATION_PREFIX,
            attribution,
            messages::CITATION_SUFFIX
        );

        Ok(SynthesizedAnswer {
            text,
            sources,
            cited_documents: top.len(),
        })
    }
}
