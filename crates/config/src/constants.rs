//! Centralized constants for the answer pipeline
//!
//! Single source of truth for tuning values and fixed user-facing text.
//! Settings default to these; code never hardcodes them elsewhere.

/// Score fusion weights for hybrid retrieval
pub mod fusion {
    /// Weight of the normalized vector-similarity score
    pub const VECTOR_WEIGHT: f32 = 0.6;

    /// Weight of the normalized lexical (BM25) score
    pub const LEXICAL_WEIGHT: f32 = 0.4;

    /// Vector search fetches `k * OVERSAMPLE` candidates to leave room
    /// for lexical disagreement before truncation
    pub const OVERSAMPLE: usize = 2;
}

/// Reranking blend weights
pub mod rerank {
    /// Weight of the retrieval-stage score in the blended ranking
    pub const PRIOR_WEIGHT: f32 = 0.4;

    /// Weight of the cross-encoder score in the blended ranking
    pub const RERANK_WEIGHT: f32 = 0.6;
}

/// Confidence gate thresholds
pub mod gate {
    /// Top documents below this final score are not trusted
    pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.3;

    /// How many top documents the contradiction check inspects
    pub const CONTRADICTION_WINDOW: usize = 3;

    /// Minimum fraction of query keywords the top documents must cover
    pub const KEYWORD_COVERAGE_RATIO: f32 = 0.5;

    /// Unit characters recognized by the numeric contradiction check
    pub const UNIT_CHARS: &str = "時間分円%枚個";

    /// Domain keywords used by the coverage check
    pub const DOMAIN_KEYWORDS: &[&str] = &[
        "利用単位",
        "利単",
        "有効期限",
        "料金",
        "時間",
        "予約",
        "キャンセル",
        "チェックイン",
        "チェックアウト",
        "清掃",
        "延長",
        "割引",
        "サービス",
        "部屋",
        "フロント",
    ];
}

/// Retrieval depth defaults
pub mod retrieval {
    /// Candidates fetched for the primary (QA) retrieval
    pub const PRIMARY_TOP_K: usize = 10;

    /// Documents kept after reranking the primary candidates
    pub const RERANK_TOP_N: usize = 5;

    /// Candidates fetched from the guideline corpus on fallback
    pub const FALLBACK_TOP_K: usize = 5;

    /// Guideline documents kept after fallback reranking
    pub const FALLBACK_RERANK_TOP_N: usize = 3;

    /// Documents whose content is handed to answer synthesis
    pub const SYNTHESIS_TOP_N: usize = 3;

    /// Candidates for the last-resort vector-only search
    pub const ERROR_FALLBACK_TOP_K: usize = 3;
}

/// Generation budgets (token limits and temperatures)
pub mod generation {
    /// Query rewriting: small budget, deterministic
    pub const REWRITE_MAX_TOKENS: usize = 100;
    pub const REWRITE_TEMPERATURE: f32 = 0.0;

    /// Answer synthesis: moderate budget, deterministic
    pub const ANSWER_MAX_TOKENS: usize = 500;
    pub const ANSWER_TEMPERATURE: f32 = 0.0;
}

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// OpenAI-compatible chat/embeddings API
    pub const OPENAI_DEFAULT: &str = "https://api.openai.com/v1";

    /// Qdrant vector store (REST port)
    pub const QDRANT_DEFAULT: &str = "http://127.0.0.1:6333";

    /// Relevance scoring service
    pub const RERANKER_DEFAULT: &str = "http://127.0.0.1:8080";
}

/// Per-call timeouts (milliseconds). Calls are retry-free; a timeout is
/// treated as the owning component's documented degradation path.
pub mod timeouts {
    pub const LLM_REQUEST_MS: u64 = 30_000;
    pub const EMBEDDING_MS: u64 = 10_000;
    pub const STORE_MS: u64 = 10_000;
    pub const RERANK_MS: u64 = 10_000;
}

/// Model name defaults
pub mod models {
    pub const CHAT_DEFAULT: &str = "gpt-4o-mini";
    pub const EMBEDDING_DEFAULT: &str = "text-embedding-3-small";
    pub const EMBEDDING_DIM_DEFAULT: usize = 1536;
}

/// Fixed user-facing text. Answers go to a chat surface, so these are
/// plain sentences, no markup.
pub mod messages {
    /// Returned when no documents survive retrieval and fallback
    pub const NOT_FOUND: &str = "申し訳ございません。該当する情報が見つかりませんでした。";

    /// Returned when even the last-resort path fails
    pub const SYSTEM_ERROR: &str =
        "申し訳ございません。システムエラーが発生しました。しばらくしてから再度お試しください。";

    /// Citation shown when no document carries a source
    pub const DEFAULT_SOURCE: &str = "マニュアル";

    /// Joins individual citations inside the attribution line
    pub const SOURCE_SEPARATOR: &str = "、";

    /// Attribution line delimiters
    pub const CITATION_PREFIX: &str = "【参照元：";
    pub const CITATION_SUFFIX: &str = "】";

    /// Separator between document contents in generation prompts
    pub const DOCUMENT_SEPARATOR: &str = "\n---\n";
}
