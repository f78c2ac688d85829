//! Translation backends
//!
//! Query normalization and response localization go through one
//! `Translator` implementation chosen at startup.

mod http;
mod noop;

pub use http::{HttpTranslator, HttpTranslatorConfig};
pub use noop::NoopTranslator;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use chat_agent_core::Translator;

/// Translation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// Remote REST translation service
    #[default]
    Http,
    /// Disabled (pass-through)
    Disabled,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Which provider to use
    #[serde(default)]
    pub provider: TranslationProvider,
    /// Service base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API subscription key (optional)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Translation model id
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    "https://api.sarvam.ai".to_string()
}

fn default_model() -> String {
    "sarvam-translate:v1".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::Http,
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Create translator based on config
pub fn create_translator(config: &TranslationConfig) -> Arc<dyn Translator> {
    match config.provider {
        TranslationProvider::Http => {
            let http_config = HttpTranslatorConfig {
                endpoint: config.endpoint.clone(),
                api_key: config.api_key.clone(),
                model: config.model.clone(),
                timeout_ms: config.timeout_ms,
            };
            match HttpTranslator::new(http_config) {
                Ok(translator) => {
                    tracing::info!(endpoint = %config.endpoint, "using HTTP translator");
                    Arc::new(translator)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to create HTTP translator, translation disabled");
                    Arc::new(NoopTranslator::new())
                }
            }
        }
        TranslationProvider::Disabled => {
            tracing::info!("translation disabled, using pass-through");
            Arc::new(NoopTranslator::new())
        }
    }
}
