//! Text processing for the chat agent
//!
//! Currently hosts the translation backends used for query normalization
//! and response localization.

pub mod translation;

pub use translation::{
    create_translator, HttpTranslator, HttpTranslatorConfig, NoopTranslator, TranslationConfig,
    TranslationProvider,
};

use thiserror::Error;

/// Translation backend errors
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported language pair: {0} -> {1}")]
    UnsupportedPair(String, String),
}

impl From<TranslationError> for chat_agent_core::Error {
    fn from(err: TranslationError) -> Self {
        chat_agent_core::Error::Translation(err.to_string())
    }
}
