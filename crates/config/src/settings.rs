//! Main settings module
//!
//! Settings layer as: constants defaults → optional TOML file →
//! `HELPDESK_*` environment variables (double underscore separates
//! sections, e.g. `HELPDESK_LLM__API_KEY`).

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{endpoints, fusion, gate, generation, models, retrieval, timeouts};
use crate::ConfigError;

/// How the retriever combines relevance signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Vector similarity fused with lexical BM25
    #[default]
    Hybrid,
    /// Vector similarity only; the fusion path runs with lexical weight 0
    VectorOnly,
}

/// Individual gate checks, applied in declaration order, first match wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateCheckKind {
    NoDocuments,
    LowConfidence,
    Contradiction,
    InsufficientElements,
}

/// Which splitter drives lexical tokenization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerKind {
    /// Unicode word boundaries with CJK run merging
    #[default]
    Segmenter,
    /// Character-class runs only (degraded mode)
    CharClass,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Retrieval depths and fusion strategy
    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// Confidence gate policy
    #[serde(default)]
    pub gate: GateSettings,

    /// Text-generation backend
    #[serde(default)]
    pub llm: LlmSettings,

    /// Embedding backend
    #[serde(default)]
    pub embedding: EmbeddingSettings,

    /// Vector store
    #[serde(default)]
    pub store: StoreSettings,

    /// Optional relevance-scoring service
    #[serde(default)]
    pub reranker: RerankerSettings,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Hybrid or vector-only retrieval
    #[serde(default)]
    pub strategy: SearchStrategy,

    /// Tokenizer driving the lexical pass
    #[serde(default)]
    pub tokenizer: TokenizerKind,

    /// Weight of the normalized vector score in fusion
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,

    /// Weight of the normalized lexical score in fusion
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f32,

    /// Vector search oversampling factor
    #[serde(default = "default_oversample")]
    pub oversample: usize,

    /// Candidates fetched for primary retrieval
    #[serde(default = "default_primary_top_k")]
    pub primary_top_k: usize,

    /// Documents kept after reranking
    #[serde(default = "default_rerank_top_n")]
    pub rerank_top_n: usize,

    /// Candidates fetched from the guideline corpus on fallback
    #[serde(default = "default_fallback_top_k")]
    pub fallback_top_k: usize,

    /// Guideline documents kept after fallback reranking
    #[serde(default = "default_fallback_rerank_top_n")]
    pub fallback_rerank_top_n: usize,

    /// Documents handed to answer synthesis
    #[serde(default = "default_synthesis_top_n")]
    pub synthesis_top_n: usize,
}

fn default_vector_weight() -> f32 {
    fusion::VECTOR_WEIGHT
}
fn default_lexical_weight() -> f32 {
    fusion::LEXICAL_WEIGHT
}
fn default_oversample() -> usize {
    fusion::OVERSAMPLE
}
fn default_primary_top_k() -> usize {
    retrieval::PRIMARY_TOP_K
}
fn default_rerank_top_n() -> usize {
    retrieval::RERANK_TOP_N
}
fn default_fallback_top_k() -> usize {
    retrieval::FALLBACK_TOP_K
}
fn default_fallback_rerank_top_n() -> usize {
    retrieval::FALLBACK_RERANK_TOP_N
}
fn default_synthesis_top_n() -> usize {
    retrieval::SYNTHESIS_TOP_N
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::default(),
            tokenizer: TokenizerKind::default(),
            vector_weight: default_vector_weight(),
            lexical_weight: default_lexical_weight(),
            oversample: default_oversample(),
            primary_top_k: default_primary_top_k(),
            rerank_top_n: default_rerank_top_n(),
            fallback_top_k: default_fallback_top_k(),
            fallback_rerank_top_n: default_fallback_rerank_top_n(),
            synthesis_top_n: default_synthesis_top_n(),
        }
    }
}

/// Confidence gate configuration.
///
/// Check order is policy, not law: the two deployment tiers this pipeline
/// unifies disagreed on it, so the order ships as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    /// Checks applied in order; first rejecting check wins
    #[serde(default = "default_checks")]
    pub checks: Vec<GateCheckKind>,

    /// Top final score below this is low confidence
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f32,

    /// Top documents inspected for contradictions
    #[serde(default = "default_contradiction_window")]
    pub contradiction_window: usize,

    /// Minimum fraction of query keywords covered by the top documents
    #[serde(default = "default_keyword_coverage_ratio")]
    pub keyword_coverage_ratio: f32,
}

fn default_checks() -> Vec<GateCheckKind> {
    vec![
        GateCheckKind::NoDocuments,
        GateCheckKind::LowConfidence,
        GateCheckKind::Contradiction,
    ]
}
fn default_low_confidence_threshold() -> f32 {
    gate::LOW_CONFIDENCE_THRESHOLD
}
fn default_contradiction_window() -> usize {
    gate::CONTRADICTION_WINDOW
}
fn default_keyword_coverage_ratio() -> f32 {
    gate::KEYWORD_COVERAGE_RATIO
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            checks: default_checks(),
            low_confidence_threshold: default_low_confidence_threshold(),
            contradiction_window: default_contradiction_window(),
            keyword_coverage_ratio: default_keyword_coverage_ratio(),
        }
    }
}

impl GateSettings {
    /// Policy of the richer deployment tier: keyword coverage runs after
    /// the contradiction check
    pub fn extended() -> Self {
        Self {
            checks: vec![
                GateCheckKind::NoDocuments,
                GateCheckKind::LowConfidence,
                GateCheckKind::Contradiction,
                GateCheckKind::InsufficientElements,
            ],
            ..Self::default()
        }
    }
}

/// Per-call generation budget
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenerationBudget {
    pub max_tokens: usize,
    pub temperature: f32,
}

/// Text-generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// OpenAI-compatible endpoint
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Chat model name
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Budget for query rewriting
    #[serde(default = "default_rewrite_budget")]
    pub rewrite: GenerationBudget,

    /// Budget for answer synthesis
    #[serde(default = "default_answer_budget")]
    pub answer: GenerationBudget,

    /// Request timeout (ms)
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_openai_endpoint() -> String {
    endpoints::OPENAI_DEFAULT.to_string()
}
fn default_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok()
}
fn default_chat_model() -> String {
    models::CHAT_DEFAULT.to_string()
}
fn default_rewrite_budget() -> GenerationBudget {
    GenerationBudget {
        max_tokens: generation::REWRITE_MAX_TOKENS,
        temperature: generation::REWRITE_TEMPERATURE,
    }
}
fn default_answer_budget() -> GenerationBudget {
    GenerationBudget {
        max_tokens: generation::ANSWER_MAX_TOKENS,
        temperature: generation::ANSWER_TEMPERATURE,
    }
}
fn default_llm_timeout_ms() -> u64 {
    timeouts::LLM_REQUEST_MS
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_openai_endpoint(),
            api_key: default_api_key(),
            model: default_chat_model(),
            rewrite: default_rewrite_budget(),
            answer: default_answer_budget(),
            timeout_ms: default_llm_timeout_ms(),
        }
    }
}

/// Embedding backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// OpenAI-compatible endpoint
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// API key; falls back to `OPENAI_API_KEY`
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimensionality
    #[serde(default = "default_embedding_dim")]
    pub dim: usize,

    /// Request timeout (ms)
    #[serde(default = "default_embedding_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_embedding_model() -> String {
    models::EMBEDDING_DEFAULT.to_string()
}
fn default_embedding_dim() -> usize {
    models::EMBEDDING_DIM_DEFAULT
}
fn default_embedding_timeout_ms() -> u64 {
    timeouts::EMBEDDING_MS
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            endpoint: default_openai_endpoint(),
            api_key: default_api_key(),
            model: default_embedding_model(),
            dim: default_embedding_dim(),
            timeout_ms: default_embedding_timeout_ms(),
        }
    }
}

/// Vector store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Qdrant endpoint
    #[serde(default = "default_qdrant_endpoint")]
    pub endpoint: String,

    /// Collection name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// API key (optional)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout (ms)
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_qdrant_endpoint() -> String {
    endpoints::QDRANT_DEFAULT.to_string()
}
fn default_collection() -> String {
    "helpdesk_kb".to_string()
}
fn default_store_timeout_ms() -> u64 {
    timeouts::STORE_MS
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            endpoint: default_qdrant_endpoint(),
            collection: default_collection(),
            api_key: None,
            timeout_ms: default_store_timeout_ms(),
        }
    }
}

/// Relevance-scoring service settings. Disabled by default; the reranker
/// degrades to retrieval scores when no scorer is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_reranker_endpoint")]
    pub endpoint: String,

    /// Weight of the retrieval-stage score in the blend
    #[serde(default = "default_prior_weight")]
    pub prior_weight: f32,

    /// Weight of the cross-encoder score in the blend
    #[serde(default = "default_rerank_weight")]
    pub rerank_weight: f32,

    /// Request timeout (ms)
    #[serde(default = "default_rerank_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_reranker_endpoint() -> String {
    endpoints::RERANKER_DEFAULT.to_string()
}
fn default_prior_weight() -> f32 {
    crate::constants::rerank::PRIOR_WEIGHT
}
fn default_rerank_weight() -> f32 {
    crate::constants::rerank::RERANK_WEIGHT
}
fn default_rerank_timeout_ms() -> u64 {
    timeouts::RERANK_MS
}

impl Default for RerankerSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_reranker_endpoint(),
            prior_weight: default_prior_weight(),
            rerank_weight: default_rerank_weight(),
            timeout_ms: default_rerank_timeout_ms(),
        }
    }
}

impl Settings {
    /// Default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from an optional TOML file plus `HELPDESK_*` environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(Environment::with_prefix("HELPDESK").separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(
            strategy = ?settings.retrieval.strategy,
            gate_checks = settings.gate.checks.len(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Validate cross-field invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.retrieval;
        if (r.vector_weight + r.lexical_weight - 1.0).abs() > 1e-3 {
            return Err(ConfigError::Invalid(format!(
                "fusion weights must sum to 1.0, got {} + {}",
                r.vector_weight, r.lexical_weight
            )));
        }
        if r.primary_top_k == 0 || r.synthesis_top_n == 0 {
            return Err(ConfigError::Invalid(
                "retrieval depths must be non-zero".to_string(),
            ));
        }
        if r.oversample == 0 {
            return Err(ConfigError::Invalid(
                "oversample must be at least 1".to_string(),
            ));
        }

        let g = &self.gate;
        if g.checks.is_empty() {
            return Err(ConfigError::Invalid(
                "gate requires at least one check".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&g.low_confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "low_confidence_threshold out of range: {}",
                g.low_confidence_threshold
            )));
        }
        if g.contradiction_window < 2 {
            return Err(ConfigError::Invalid(
                "contradiction_window must cover at least two documents".to_string(),
            ));
        }

        let rr = &self.reranker;
        if rr.enabled && (rr.prior_weight + rr.rerank_weight - 1.0).abs() > 1e-3 {
            return Err(ConfigError::Invalid(format!(
                "rerank weights must sum to 1.0, got {} + {}",
                rr.prior_weight, rr.rerank_weight
            )));
        }

        Ok(())
    }
}
