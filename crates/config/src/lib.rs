//! Configuration management for the chat agent
//!
//! Supports loading configuration from:
//! - TOML files
//! - Environment variables (CHAT_AGENT_ prefix)

pub mod prompts;
pub mod settings;

pub use prompts::{render_user_prompt, FALLBACK_MESSAGE, SYSTEM_PROMPT};
pub use settings::{
    EmbeddingProvider, EmbeddingSettings, LlmSettings, PipelineSettings, RagSettings,
    RuntimeEnvironment, Settings, SttSettings, TranslationProvider, TranslationSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl From<ConfigError> for chat_agent_core::Error {
    fn from(err: ConfigError) -> Self {
        chat_agent_core::Error::Config(err.to_string())
    }
}
