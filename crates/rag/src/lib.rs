//! Vector store for retrieval-augmented generation
//!
//! Features:
//! - Sentence-aware chunking with character overlap
//! - Deterministic local embeddings plus a remote embedding backend
//! - Parallel URL fetching with readable-text extraction
//! - Append-only in-memory collection with cosine similarity search

pub mod chunker;
pub mod embeddings;
pub mod fetch;
pub mod store;

pub use chunker::{ChunkConfig, TextChunker};
pub use embeddings::{EmbeddingConfig, HashEmbedder, HttpEmbedder, HttpEmbeddingConfig};
pub use fetch::{extract_text, FetchConfig, HttpPageFetcher};
pub use store::{
    ContextChunk, IngestFailure, IngestReport, IngestSource, KnowledgeStore, RetrievedContext,
    ScoredChunk, StoreConfig,
};

use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },
}

impl From<RagError> for chat_agent_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Fetch { url, message } => chat_agent_core::Error::Fetch { url, message },
            other => chat_agent_core::Error::Retrieval(other.to_string()),
        }
    }
}
