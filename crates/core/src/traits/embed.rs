//! Embedding trait

use async_trait::async_trait;

use crate::Result;

/// Embedding function interface
///
/// Implementations:
/// - `HashEmbedder` - deterministic local embedder (no model required)
/// - `HttpEmbedder` - remote embedding service
///
/// The embedding function is fixed for the lifetime of a collection:
/// chunks embedded under one function are never compared against a query
/// embedded under a different one.
#[async_trait]
pub trait Embedder: Send + Sync + 'static {
    /// Embed a text into a fixed-length vector
    ///
    /// Deterministic for identical input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get embedding dimension
    fn dim(&self) -> usize;

    /// Get embedder name for logging
    fn name(&self) -> &str;
}
