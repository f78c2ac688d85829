//! LLM integration
//!
//! An OpenAI-compatible chat completion backend with whole-response and
//! streaming generation, plus the prompt builder for grounded answers.

pub mod backend;
pub mod prompt;

pub use backend::{OpenAiBackend, OpenAiConfig};
pub use prompt::PromptBuilder;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<LlmError> for chat_agent_core::Error {
    fn from(err: LlmError) -> Self {
        chat_agent_core::Error::Generation(err.to_string())
    }
}
