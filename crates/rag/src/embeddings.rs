//! Text embeddings
//!
//! Two backends behind the core `Embedder` trait: a deterministic local
//! hash-projection embedder that needs no model, and a remote embedding
//! service client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chat_agent_core::{Embedder, Result};

use crate::RagError;

/// Embedding configuration
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Embedding dimension
    pub dim: usize,
    /// Normalize embeddings to unit length
    pub normalize: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dim: 384,
            normalize: true,
        }
    }
}

/// Deterministic bag-of-words hash embedder
///
/// Each lowercased token is hashed into a bucket of the output vector.
/// Texts sharing vocabulary land in shared buckets, which is enough for
/// cosine ranking in tests and small local deployments.
pub struct HashEmbedder {
    config: EmbeddingConfig,
}

impl HashEmbedder {
    /// Create a new hash embedder
    pub fn new(config: EmbeddingConfig) -> Self {
        Self { config }
    }

    fn project(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.config.dim];

        for token in text.split_whitespace() {
            let token: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let idx = (hasher.finish() as usize) % self.config.dim;
            embedding[idx] += 1.0;
        }

        if self.config.normalize {
            normalize(&mut embedding);
        }

        embedding
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EmbeddingConfig::default())
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.project(text))
    }

    fn dim(&self) -> usize {
        self.config.dim
    }

    fn name(&self) -> &str {
        "hash-embedder"
    }
}

/// Remote embedding service configuration
#[derive(Debug, Clone)]
pub struct HttpEmbeddingConfig {
    /// Service base URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Embedding dimension
    pub dim: usize,
}

impl Default for HttpEmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "all-minilm:l6-v2".to_string(),
            dim: 384,
        }
    }
}

/// Request to the embedding API
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response from the embedding API
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Remote embedder
pub struct HttpEmbedder {
    client: Client,
    config: HttpEmbeddingConfig,
}

impl HttpEmbedder {
    /// Create a new remote embedder
    pub fn new(config: HttpEmbeddingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.config.model,
            input: text,
        };

        let url = format!("{}/api/embed", self.config.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(RagError::Embedding(format!(
                "embedding service returned {}",
                status
            ))
            .into());
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("invalid embedding response: {}", e)))?;

        let mut embedding = parsed
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("empty embedding response".to_string()))?;

        if embedding.len() != self.config.dim {
            return Err(RagError::Embedding(format!(
                "expected dimension {}, got {}",
                self.config.dim,
                embedding.len()
            ))
            .into());
        }

        normalize(&mut embedding);
        Ok(embedding)
    }

    fn dim(&self) -> usize {
        self.config.dim
    }

    fn name(&self) -> &str {
        "http-embedder"
    }
}

/// Normalize a vector to unit length in place
fn normalize(embedding: &mut [f32]) {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in embedding.iter_mut() {
            *v /= norm;
        }
    }
}
