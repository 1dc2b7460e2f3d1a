//! Configuration for the helpdesk answer pipeline
//!
//! Layered settings (defaults → TOML file → `HELPDESK_*` environment) plus
//! a single source of truth for tuning constants and fixed user-facing
//! messages.

pub mod constants;
pub mod settings;

pub use settings::{
    EmbeddingSettings, GateCheckKind, GateSettings, GenerationBudget, LlmSettings,
    RerankerSettings, RetrievalSettings, SearchStrategy, Settings, StoreSettings, TokenizerKind,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}
