//! Core traits and types for the chat agent
//!
//! This crate provides foundational types used across all other crates:
//! - Core traits for pluggable backends (STT, translation, LLM, embeddings)
//! - Language definitions and script detection
//! - Chat request/response types
//! - Error types

pub mod chat;
pub mod error;
pub mod language;
pub mod llm_types;
pub mod traits;

pub use chat::{ChatInput, ChatRequest, ChatResponse, ChatStreamEvent, RawChatRequest};
pub use error::{Error, Result};
pub use language::{Language, Script};
pub use llm_types::{
    FinishReason, GenerateRequest, GenerateResponse, Message, Role, StreamChunk, TokenUsage,
};

// Trait re-exports
pub use traits::{
    Embedder, LanguageModel, PageFetcher, SpeechToText, Transcription, Translator,
};
