//! Chat orchestration pipeline
//!
//! Coordinates transcription, language detection, translation, context
//! retrieval, and generation to turn one inbound request into one
//! outbound response or response stream.

pub mod orchestrator;
pub mod stt;

pub use orchestrator::{ChatOrchestrator, OrchestratorConfig};
pub use stt::{HttpSttBackend, HttpSttConfig};
