//! Capability traits
//!
//! Narrow contracts for the external collaborators the pipeline depends
//! on. Concrete backends live in the rag, llm, text_processing, and
//! pipeline crates; everything here is implementation-agnostic.

mod embed;
mod fetch;
mod llm;
mod speech;
mod translate;

pub use embed::Embedder;
pub use fetch::PageFetcher;
pub use llm::LanguageModel;
pub use speech::{SpeechToText, Transcription};
pub use translate::Translator;
