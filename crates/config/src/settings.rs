//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use chat_agent_core::Language;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Orchestration pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Generation backend configuration
    #[serde(default)]
    pub llm: LlmSettings,

    /// Translation backend configuration
    #[serde(default)]
    pub translation: TranslationSettings,

    /// Transcription backend configuration
    #[serde(default)]
    pub stt: SttSettings,

    /// Vector store configuration
    #[serde(default)]
    pub rag: RagSettings,
}

/// Orchestration pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// The single internal working language used for retrieval and
    /// generation regardless of the user's input language
    #[serde(default)]
    pub working_language: Language,

    /// Number of context chunks retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Per-stage timeouts in milliseconds
    #[serde(default = "default_transcription_timeout_ms")]
    pub transcription_timeout_ms: u64,
    #[serde(default = "default_translation_timeout_ms")]
    pub translation_timeout_ms: u64,
    #[serde(default = "default_retrieval_timeout_ms")]
    pub retrieval_timeout_ms: u64,
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,
}

fn default_top_k() -> usize {
    3
}

fn default_transcription_timeout_ms() -> u64 {
    30_000
}

fn default_translation_timeout_ms() -> u64 {
    10_000
}

fn default_retrieval_timeout_ms() -> u64 {
    5_000
}

fn default_generation_timeout_ms() -> u64 {
    60_000
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            working_language: Language::English,
            top_k: default_top_k(),
            transcription_timeout_ms: default_transcription_timeout_ms(),
            translation_timeout_ms: default_translation_timeout_ms(),
            retrieval_timeout_ms: default_retrieval_timeout_ms(),
            generation_timeout_ms: default_generation_timeout_ms(),
        }
    }
}

/// Generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// OpenAI-compatible API base URL
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    /// API key (optional, also read from CHAT_AGENT__LLM__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model id
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in milliseconds
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_llm_endpoint() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_llm_model() -> String {
    "qwen2.5:7b-instruct-q4_K_M".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout_ms() -> u64 {
    60_000
}

fn default_max_retries() -> u32 {
    3
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: None,
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: default_llm_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Translation provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// Remote REST translation service
    #[default]
    Http,
    /// Disabled (pass-through)
    Disabled,
}

/// Translation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    #[serde(default)]
    pub provider: TranslationProvider,
    /// Translation service base URL
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,
    /// API subscription key (optional)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Translation model id
    #[serde(default = "default_translation_model")]
    pub model: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_translation_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_translation_endpoint() -> String {
    "https://api.sarvam.ai".to_string()
}

fn default_translation_model() -> String {
    "sarvam-translate:v1".to_string()
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::Http,
            endpoint: default_translation_endpoint(),
            api_key: None,
            model: default_translation_model(),
            timeout_ms: default_translation_timeout_ms(),
        }
    }
}

/// Transcription backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttSettings {
    /// Transcription service base URL
    #[serde(default = "default_stt_endpoint")]
    pub endpoint: String,
    /// API key (optional)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds
    #[serde(default = "default_transcription_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_stt_endpoint() -> String {
    "http://127.0.0.1:8090".to_string()
}

impl Default for SttSettings {
    fn default() -> Self {
        Self {
            endpoint: default_stt_endpoint(),
            api_key: None,
            timeout_ms: default_transcription_timeout_ms(),
        }
    }
}

/// Embedding provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic local embedder (no model required)
    #[default]
    Hash,
    /// Remote embedding service
    Http,
}

/// Embedding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub provider: EmbeddingProvider,
    /// Embedding service base URL (Http provider)
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    /// Embedding model id (Http provider)
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Embedding dimension
    #[serde(default = "default_embedding_dim")]
    pub dim: usize,
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm:l6-v2".to_string()
}

fn default_embedding_dim() -> usize {
    384
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            endpoint: default_embedding_endpoint(),
            model: default_embedding_model(),
            dim: default_embedding_dim(),
        }
    }
}

/// Vector store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSettings {
    /// Embedding function configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    /// Maximum chunk size in characters
    #[serde(default = "default_chunk_max_chars")]
    pub chunk_max_chars: usize,
    /// Character overlap carried between consecutive chunks
    #[serde(default = "default_chunk_overlap_chars")]
    pub chunk_overlap_chars: usize,
    /// Bounded worker count for parallel URL fetches
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Per-URL fetch timeout in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_chunk_max_chars() -> usize {
    500
}

fn default_chunk_overlap_chars() -> usize {
    100
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            embedding: EmbeddingSettings::default(),
            chunk_max_chars: default_chunk_max_chars(),
            chunk_overlap_chars: default_chunk_overlap_chars(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl Settings {
    /// Load settings from an optional TOML file plus environment overrides
    ///
    /// Environment variables use the `CHAT_AGENT_` prefix with `__` as the
    /// section separator, e.g. `CHAT_AGENT__LLM__API_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("CHAT_AGENT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.top_k == 0 {
            return Err(ConfigError::Validation(
                "pipeline.top_k must be at least 1".to_string(),
            ));
        }
        if self.rag.chunk_max_chars == 0 {
            return Err(ConfigError::Validation(
                "rag.chunk_max_chars must be positive".to_string(),
            ));
        }
        if self.rag.chunk_overlap_chars >= self.rag.chunk_max_chars {
            return Err(ConfigError::Validation(
                "rag.chunk_overlap_chars must be smaller than rag.chunk_max_chars".to_string(),
            ));
        }
        if self.rag.max_concurrent_fetches == 0 {
            return Err(ConfigError::Validation(
                "rag.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.rag.embedding.dim == 0 {
            return Err(ConfigError::Validation(
                "rag.embedding.dim must be positive".to_string(),
            ));
        }
        if self.environment.is_production() && self.llm.api_key.is_none() {
            tracing::warn!("running in production without an LLM API key");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.pipeline.working_language, Language::English);
        assert_eq!(settings.pipeline.top_k, 3);
        assert_eq!(settings.rag.chunk_max_chars, 500);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_top_k() {
        let mut settings = Settings::default();
        settings.pipeline.top_k = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_overlap() {
        let mut settings = Settings::default();
        settings.rag.chunk_overlap_chars = settings.rag.chunk_max_chars;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[pipeline]
working_language = "hindi"
top_k = 5

[llm]
model = "llama3:8b"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.pipeline.working_language, Language::Hindi);
        assert_eq!(settings.pipeline.top_k, 5);
        assert_eq!(settings.llm.model, "llama3:8b");
        // Untouched sections keep their defaults
        assert_eq!(settings.rag.chunk_max_chars, 500);
    }
}
