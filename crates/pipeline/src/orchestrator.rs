//! Answer pipeline orchestrator
//!
//! Sequences rewriting → primary retrieval → reranking → gate check →
//! optional guideline fallback → synthesis, and owns the last-resort
//! error path. `chat` never fails: every input terminates in a
//! `ChatResult` whose trace records which branches were taken. Dropping
//! the returned future cancels whatever external call is in flight; no
//! partial results are cached.

use std::sync::Arc;

use helpdesk_config::constants::{messages, retrieval};
use helpdesk_config::{GenerationBudget, RetrievalSettings, Settings};
use helpdesk_core::{
    ChatResult, DocumentStore, DocumentType, Embedder, ProcessTrace, RelevanceScorer,
    ScoredDocument, SearchMode,
};
use helpdesk_llm::{prompt, LlmBackend};
use helpdesk_rag::{ConfidenceGate, HybridRetriever, Reranker, Tokenizer};

use crate::rewriter::QueryRewriter;
use crate::synthesizer::AnswerSynthesizer;
use crate::PipelineError;

/// Pipeline stages, recorded in logs as the request advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Rewriting,
    PrimaryRetrieval,
    Reranking,
    GateCheck,
    Fallback,
    Synthesizing,
    ErrorFallback,
}

/// Builder wiring external collaborators into a pipeline.
///
/// The pipeline is constructed once at process start and shared by
/// reference across request handlers; it holds no per-request state.
pub struct PipelineBuilder {
    settings: Settings,
    embedder: Option<Arc<dyn Embedder>>,
    store: Option<Arc<dyn DocumentStore>>,
    llm: Option<Arc<dyn LlmBackend>>,
    scorer: Option<Arc<dyn RelevanceScorer>>,
}

impl PipelineBuilder {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            embedder: None,
            store: None,
            llm: None,
            scorer: None,
        }
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn llm(mut self, llm: Arc<dyn LlmBackend>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Inject the optional relevance scorer. Without it the reranker
    /// keeps retrieval scores.
    pub fn relevance_scorer(mut self, scorer: Arc<dyn RelevanceScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn build(self) -> Result<AnswerPipeline, PipelineError> {
        let embedder = self
            .embedder
            .ok_or_else(|| PipelineError::Configuration("embedder is required".to_string()))?;
        let store = self
            .store
            .ok_or_else(|| PipelineError::Configuration("document store is required".to_string()))?;
        let llm = self
            .llm
            .ok_or_else(|| PipelineError::Configuration("llm backend is required".to_string()))?;

        let retriever = HybridRetriever::new(
            (&self.settings.retrieval).into(),
            embedder,
            store,
        )
        .with_tokenizer(Tokenizer::new(self.settings.retrieval.tokenizer.into()));

        let reranker = match self.scorer {
            Some(scorer) if self.settings.reranker.enabled => {
                Reranker::new(scorer, &self.settings.reranker)
            }
            Some(_) => {
                tracing::info!("relevance scorer injected but disabled by settings");
                Reranker::disabled()
            }
            None => Reranker::disabled(),
        };

        Ok(AnswerPipeline {
            rewriter: QueryRewriter::new(llm.clone(), &self.settings.llm),
            synthesizer: AnswerSynthesizer::new(
                llm.clone(),
                &self.settings.llm,
                self.settings.retrieval.synthesis_top_n,
            ),
            gate: ConfidenceGate::new(&self.settings.gate),
            answer_budget: self.settings.llm.answer,
            depths: self.settings.retrieval.clone(),
            retriever,
            reranker,
            llm,
        })
    }
}

/// The request → answer pipeline
pub struct AnswerPipeline {
    rewriter: QueryRewriter,
    retriever: HybridRetriever,
    reranker: Reranker,
    gate: ConfidenceGate,
    synthesizer: AnswerSynthesizer,
    llm: Arc<dyn LlmBackend>,
    depths: RetrievalSettings,
    answer_budget: GenerationBudget,
}

impl AnswerPipeline {
    /// Answer one question. Never fails; degraded paths are visible in
    /// the returned trace only.
    pub async fn chat(&self, question: &str) -> ChatResult {
        let mut trace = ProcessTrace::new(question);
        tracing::info!(request_id = %trace.request_id, "answer pipeline started");

        match self.answer_inner(question, &mut trace).await {
            Ok(answer) => ChatResult::new(answer, trace),
            Err(e) => {
                tracing::error!(
                    request_id = %trace.request_id,
                    error = %e,
                    stage = ?PipelineStage::ErrorFallback,
                    "pipeline failed, taking last-resort path"
                );
                self.error_fallback(question, trace).await
            }
        }
    }

    async fn answer_inner(
        &self,
        question: &str,
        trace: &mut ProcessTrace,
    ) -> Result<String, PipelineError> {
        tracing::debug!(stage = ?PipelineStage::Rewriting, "rewriting query");
        let query = self.rewriter.rewrite(question).await;
        trace.rewritten_query = query.rewritten.clone();

        tracing::debug!(stage = ?PipelineStage::PrimaryRetrieval, "retrieving from QA corpus");
        let mut candidates = self
            .retriever
            .retrieve(
                query.effective(),
                Some(&DocumentType::Qa),
                self.depths.primary_top_k,
            )
            .await?;

        // Nothing in the QA partition: widen to the whole corpus
        if candidates.is_empty() {
            trace.search_mode = SearchMode::All;
            candidates = self
                .retriever
                .retrieve(query.effective(), None, self.depths.primary_top_k)
                .await?;
        }

        tracing::debug!(
            stage = ?PipelineStage::Reranking,
            candidates = candidates.len(),
            "reranking candidates"
        );
        let mut ranked = self
            .reranker
            .rerank(query.effective(), candidates, self.depths.rerank_top_n)
            .await;

        // The gate must see completed reranked scores before deciding
        tracing::debug!(stage = ?PipelineStage::GateCheck, "evaluating confidence");
        let verdict = self.gate.evaluate(question, &ranked);
        trace.confidence = Some(verdict);

        if !verdict.is_confident {
            trace.fallback_used = true;
            tracing::debug!(
                stage = ?PipelineStage::Fallback,
                reason = %verdict.reason,
                "gate rejected primary results, querying guideline corpus"
            );

            let guideline = self
                .retriever
                .retrieve(
                    query.effective(),
                    Some(&DocumentType::Guideline),
                    self.depths.fallback_top_k,
                )
                .await?;

            if guideline.is_empty() {
                tracing::debug!("guideline corpus empty, answering from unconfident results");
            } else {
                let guideline_ranked = self
                    .reranker
                    .rerank(
                        query.effective(),
                        guideline,
                        self.depths.fallback_rerank_top_n,
                    )
                    .await;

                ranked.extend(guideline_ranked);
                ranked.sort_by(|a, b| {
                    b.final_score
                        .partial_cmp(&a.final_score)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                ranked.truncate(self.depths.rerank_top_n);
            }
        }

        tracing::debug!(stage = ?PipelineStage::Synthesizing, documents = ranked.len(), "synthesizing answer");
        let synthesized = self.synthesizer.synthesize(question, &ranked).await?;
        trace.sources = synthesized.sources;
        trace.sources_count = synthesized.cited_documents;

        Ok(synthesized.text)
    }

    /// Last resort: one vector-only search and one simplified generation
    /// call. If this also fails, the fixed apology goes out with the
    /// system-error flag set.
    async fn error_fallback(&self, question: &str, mut trace: ProcessTrace) -> ChatResult {
        trace.error_fallback = true;

        match self.try_error_fallback(question).await {
            Ok(answer) => ChatResult::new(answer, trace),
            Err(e) => {
                tracing::error!(
                    request_id = %trace.request_id,
                    error = %e,
                    "last-resort path failed"
                );
                trace.system_error = true;
                ChatResult::new(messages::SYSTEM_ERROR, trace)
            }
        }
    }

    async fn try_error_fallback(&self, question: &str) -> Result<String, PipelineError> {
        let documents = self
            .retriever
            .vector_search(question, retrieval::ERROR_FALLBACK_TOP_K)
            .await?;

        if documents.is_empty() {
            return Err(PipelineError::Generation(
                "no documents available for the last-resort answer".to_string(),
            ));
        }

        let combined = documents
            .iter()
            .map(|d: &ScoredDocument| d.document.content.as_str())
            .collect::<Vec<_>>()
            .join(messages::DOCUMENT_SEPARATOR);

        let generation = self
            .llm
            .generate(
                &prompt::simple_answer_prompt(&combined, question),
                self.answer_budget,
            )
            .await?;

        Ok(generation.text.trim().to_string())
    }
}
