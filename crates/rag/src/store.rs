//! Append-only vector collection with similarity search
//!
//! The collection is the one process-wide shared resource: reads take a
//! shared lock, and an ingest batch is appended under a single write-lock
//! acquisition so a concurrent search sees either the pre-ingest or the
//! post-ingest collection, never a partial one. No lock is held across an
//! await point; embedding and fetching happen before the append.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use chat_agent_core::{Embedder, PageFetcher};

use crate::chunker::{ChunkConfig, TextChunker};
use crate::RagError;

/// One unit of retrievable text
///
/// Created at ingestion time, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    pub id: Uuid,
    pub text: String,
    pub embedding: Vec<f32>,
    /// Origin URL for scraped content
    pub source: Option<String>,
}

/// A chunk returned from search, with its similarity score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub id: Uuid,
    pub text: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Ordered search result for one query, most relevant first
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievedContext {
    pub hits: Vec<ScoredChunk>,
}

impl RetrievedContext {
    /// Check whether any context was found
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Concatenate hit texts for prompt assembly
    pub fn joined_text(&self) -> String {
        self.hits
            .iter()
            .map(|hit| hit.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// What to ingest: raw texts, or URLs to fetch and extract first
#[derive(Debug, Clone)]
pub enum IngestSource {
    Texts(Vec<String>),
    Urls(Vec<String>),
}

/// One failed item of an ingest batch
#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    /// The URL or a preview of the text that failed
    pub item: String,
    pub message: String,
}

/// Outcome of one ingest batch
///
/// A batch with failures still commits the successes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Number of chunks appended to the collection
    pub ingested_chunks: usize,
    pub failures: Vec<IngestFailure>,
}

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Chunking parameters
    pub chunking: ChunkConfig,
    /// Bounded worker count for parallel URL fetches
    pub max_concurrent_fetches: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkConfig::default(),
            max_concurrent_fetches: 4,
        }
    }
}

/// The collection state guarded by one lock
#[derive(Default)]
struct Collection {
    chunks: Vec<ContextChunk>,
    /// Content hashes of stored chunk texts, for ingest-time dedup
    seen_hashes: HashSet<u64>,
    /// Last extracted-content hash per ingested URL
    url_hashes: HashMap<String, u64>,
}

/// In-memory vector store
///
/// The embedding function is fixed at construction for the lifetime of the
/// collection; changing the embedding scheme requires a new store and
/// re-ingesting all chunks.
pub struct KnowledgeStore {
    embedder: Arc<dyn Embedder>,
    fetcher: Arc<dyn PageFetcher>,
    chunker: TextChunker,
    max_concurrent_fetches: usize,
    /// Serializes ingest batches relative to each other
    ingest_gate: Mutex<()>,
    collection: RwLock<Collection>,
}

impl KnowledgeStore {
    /// Create a new store
    pub fn new(
        embedder: Arc<dyn Embedder>,
        fetcher: Arc<dyn PageFetcher>,
        config: StoreConfig,
    ) -> Self {
        Self {
            embedder,
            fetcher,
            chunker: TextChunker::new(config.chunking),
            max_concurrent_fetches: config.max_concurrent_fetches.max(1),
            ingest_gate: Mutex::new(()),
            collection: RwLock::new(Collection::default()),
        }
    }

    /// Number of chunks in the collection
    pub fn len(&self) -> usize {
        self.collection.read().chunks.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ingest texts or URLs into the collection
    ///
    /// Append-only: no existing chunk is altered. Per-item failures are
    /// reported in the result and do not abort the batch. Chunks whose text
    /// is already stored are skipped.
    pub async fn ingest(&self, source: IngestSource) -> Result<IngestReport, RagError> {
        let _gate = self.ingest_gate.lock().await;

        let mut report = IngestReport::default();
        let mut url_updates: Vec<(String, u64)> = Vec::new();

        let texts: Vec<(Option<String>, String)> = match source {
            IngestSource::Texts(texts) => {
                if texts.is_empty() {
                    return Err(RagError::Store("no texts provided".to_string()));
                }
                texts.into_iter().map(|t| (None, t)).collect()
            }
            IngestSource::Urls(urls) => {
                if urls.is_empty() {
                    return Err(RagError::Store("no urls provided".to_string()));
                }
                self.fetch_pages(urls, &mut report.failures, &mut url_updates)
                    .await
            }
        };

        let mut pending: Vec<ContextChunk> = Vec::new();
        let mut batch_hashes: HashSet<u64> = HashSet::new();

        for (source_url, text) in texts {
            match self
                .embed_chunks(&text, source_url.as_deref(), &mut batch_hashes)
                .await
            {
                Ok(chunks) => pending.extend(chunks),
                Err(e) => {
                    let item = source_url.unwrap_or_else(|| preview(&text));
                    tracing::warn!(item = %item, error = %e, "failed to ingest item");
                    report.failures.push(IngestFailure {
                        item,
                        message: e.to_string(),
                    });
                }
            }
        }

        report.ingested_chunks = pending.len();

        // One write-lock acquisition: the whole batch becomes visible
        // atomically with respect to concurrent searches.
        {
            let mut collection = self.collection.write();
            for chunk in &pending {
                collection.seen_hashes.insert(content_hash(&chunk.text));
            }
            for (url, hash) in url_updates {
                collection.url_hashes.insert(url, hash);
            }
            collection.chunks.append(&mut pending);
        }

        tracing::info!(
            ingested = report.ingested_chunks,
            failed = report.failures.len(),
            collection_size = self.len(),
            "ingest batch committed"
        );

        Ok(report)
    }

    /// Search the collection for the `k` chunks most similar to `query`
    ///
    /// Results are sorted by descending similarity; ties keep insertion
    /// order. `k` larger than the collection returns the whole collection;
    /// an empty collection returns an empty result.
    pub async fn search(&self, query: &str, k: usize) -> Result<RetrievedContext, RagError> {
        if k == 0 {
            return Err(RagError::Search("k must be at least 1".to_string()));
        }
        if self.is_empty() {
            return Ok(RetrievedContext::default());
        }

        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RagError::Embedding(e.to_string()))?;

        let collection = self.collection.read();
        let mut hits: Vec<ScoredChunk> = collection
            .chunks
            .iter()
            .map(|chunk| ScoredChunk {
                id: chunk.id,
                text: chunk.text.clone(),
                score: cosine_similarity(&query_embedding, &chunk.embedding),
                source: chunk.source.clone(),
            })
            .collect();
        drop(collection);

        // Stable sort keeps insertion order for equal scores
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);

        tracing::debug!(query_len = query.len(), hits = hits.len(), "search complete");

        Ok(RetrievedContext { hits })
    }

    /// Fetch URLs with bounded parallelism, in input order
    async fn fetch_pages(
        &self,
        urls: Vec<String>,
        failures: &mut Vec<IngestFailure>,
        url_updates: &mut Vec<(String, u64)>,
    ) -> Vec<(Option<String>, String)> {
        let fetches = urls.into_iter().map(|url| {
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                let result = fetcher.fetch_text(&url).await;
                (url, result)
            }
        });

        let results: Vec<_> = stream::iter(fetches)
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        let mut pages = Vec::new();
        for (url, result) in results {
            match result {
                Ok(text) => {
                    let hash = content_hash(&text);
                    if self.collection.read().url_hashes.get(&url) == Some(&hash) {
                        tracing::debug!(url = %url, "content unchanged since last ingest, skipping");
                        continue;
                    }
                    url_updates.push((url.clone(), hash));
                    pages.push((Some(url), text));
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "failed to fetch url");
                    failures.push(IngestFailure {
                        item: url,
                        message: e.to_string(),
                    });
                }
            }
        }

        pages
    }

    /// Chunk and embed one text, skipping chunks already stored
    async fn embed_chunks(
        &self,
        text: &str,
        source: Option<&str>,
        batch_hashes: &mut HashSet<u64>,
    ) -> Result<Vec<ContextChunk>, RagError> {
        let mut chunks = Vec::new();

        for piece in self.chunker.chunk(text) {
            let hash = content_hash(&piece);
            if batch_hashes.contains(&hash) || self.collection.read().seen_hashes.contains(&hash) {
                tracing::debug!("skipping duplicate chunk");
                continue;
            }

            let embedding = self
                .embedder
                .embed(&piece)
                .await
                .map_err(|e| RagError::Embedding(e.to_string()))?;

            batch_hashes.insert(hash);
            chunks.push(ContextChunk {
                id: Uuid::new_v4(),
                text: piece,
                embedding,
                source: source.map(str::to_string),
            });
        }

        Ok(chunks)
    }
}

/// Hash of a chunk or page text, for dedup
fn content_hash(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}

/// Cosine similarity of two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Short preview of a text for failure reports
fn preview(text: &str) -> String {
    const MAX: usize = 48;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chat_agent_core::{Error, PageFetcher, Result as CoreResult};

    use crate::embeddings::HashEmbedder;

    struct MapFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for MapFetcher {
        async fn fetch_text(&self, url: &str) -> CoreResult<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| Error::fetch(url, "not found"))
        }
    }

    fn test_store() -> KnowledgeStore {
        KnowledgeStore::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(MapFetcher {
                pages: HashMap::new(),
            }),
            StoreConfig::default(),
        )
    }

    fn store_with_pages(pages: &[(&str, &str)]) -> KnowledgeStore {
        KnowledgeStore::new(
            Arc::new(HashEmbedder::default()),
            Arc::new(MapFetcher {
                pages: pages
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }),
            StoreConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_ingest_and_search_example() {
        let store = test_store();
        let report = store
            .ingest(IngestSource::Texts(vec![
                "Riyadh is the capital of Saudi Arabia.".to_string(),
            ]))
            .await
            .unwrap();
        assert_eq!(report.ingested_chunks, 1);
        assert!(report.failures.is_empty());

        let context = store
            .search("What is the capital of Saudi Arabia?", 1)
            .await
            .unwrap();
        assert_eq!(context.hits.len(), 1);
        assert!(context.hits[0].text.contains("Riyadh"));
    }

    #[tokio::test]
    async fn test_search_empty_collection() {
        let store = test_store();
        let context = store.search("anything", 3).await.unwrap();
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_zero_k() {
        let store = test_store();
        assert!(matches!(
            store.search("anything", 0).await,
            Err(RagError::Search(_))
        ));
    }

    #[tokio::test]
    async fn test_search_never_exceeds_k_or_collection() {
        let store = test_store();
        store
            .ingest(IngestSource::Texts(vec![
                "Jeddah is a port city.".to_string(),
                "Dammam is in the east.".to_string(),
            ]))
            .await
            .unwrap();

        let context = store.search("city", 1).await.unwrap();
        assert_eq!(context.hits.len(), 1);

        let context = store.search("city", 10).await.unwrap();
        assert_eq!(context.hits.len(), 2);
    }

    #[tokio::test]
    async fn test_scores_sorted_descending() {
        let store = test_store();
        store
            .ingest(IngestSource::Texts(vec![
                "The capital of Saudi Arabia is Riyadh.".to_string(),
                "Unrelated text about cooking rice.".to_string(),
            ]))
            .await
            .unwrap();

        let context = store.search("capital of Saudi Arabia", 2).await.unwrap();
        assert_eq!(context.hits.len(), 2);
        assert!(context.hits[0].score >= context.hits[1].score);
        assert!(context.hits[0].text.contains("Riyadh"));
    }

    #[tokio::test]
    async fn test_equal_scores_keep_insertion_order() {
        let store = test_store();
        store
            .ingest(IngestSource::Texts(vec![
                "First fact about visas.".to_string(),
                "Second fact about permits.".to_string(),
            ]))
            .await
            .unwrap();

        // A query with no embeddable tokens scores every chunk 0.0
        let context = store.search("?!", 2).await.unwrap();
        assert_eq!(context.hits[0].score, context.hits[1].score);
        assert!(context.hits[0].text.starts_with("First"));
        assert!(context.hits[1].text.starts_with("Second"));
    }

    #[tokio::test]
    async fn test_ingest_is_append_only() {
        let store = test_store();
        store
            .ingest(IngestSource::Texts(vec![
                "Riyadh is the capital of Saudi Arabia.".to_string(),
            ]))
            .await
            .unwrap();
        let before = store.len();

        store
            .ingest(IngestSource::Texts(vec![
                "The riyal is the currency of Saudi Arabia.".to_string(),
            ]))
            .await
            .unwrap();
        assert!(store.len() > before);

        // A chunk only present in the first batch is still retrievable
        let context = store.search("capital Riyadh", 1).await.unwrap();
        assert!(context.hits[0].text.contains("capital"));
    }

    #[tokio::test]
    async fn test_duplicate_text_stored_once() {
        let store = test_store();
        let text = "Umrah visas are issued year round.".to_string();
        store
            .ingest(IngestSource::Texts(vec![text.clone()]))
            .await
            .unwrap();
        let report = store
            .ingest(IngestSource::Texts(vec![text]))
            .await
            .unwrap();

        assert_eq!(report.ingested_chunks, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_url_ingest_partial_failure() {
        let store = store_with_pages(&[(
            "http://good.example/guide",
            "The Iqama must be renewed yearly.",
        )]);

        let report = store
            .ingest(IngestSource::Urls(vec![
                "http://good.example/guide".to_string(),
                "http://bad.example/missing".to_string(),
            ]))
            .await
            .unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].item, "http://bad.example/missing");
        assert!(report.ingested_chunks > 0);

        let context = store.search("Iqama renewal", 1).await.unwrap();
        assert_eq!(
            context.hits[0].source.as_deref(),
            Some("http://good.example/guide")
        );
    }

    #[tokio::test]
    async fn test_unchanged_url_skipped_on_reingest() {
        let store = store_with_pages(&[(
            "http://good.example/guide",
            "The Iqama must be renewed yearly.",
        )]);

        let url = vec!["http://good.example/guide".to_string()];
        let first = store.ingest(IngestSource::Urls(url.clone())).await.unwrap();
        assert!(first.ingested_chunks > 0);

        let second = store.ingest(IngestSource::Urls(url)).await.unwrap();
        assert_eq!(second.ingested_chunks, 0);
        assert!(second.failures.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_rejected() {
        let store = test_store();
        assert!(store.ingest(IngestSource::Texts(vec![])).await.is_err());
        assert!(store.ingest(IngestSource::Urls(vec![])).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_search_sees_whole_batches() {
        let store = Arc::new(test_store());
        let batch: Vec<String> = (0..50)
            .map(|i| format!("Document number {} about residency rules.", i))
            .collect();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.ingest(IngestSource::Texts(batch)).await.unwrap();
            })
        };

        for _ in 0..20 {
            let len = store.len();
            assert!(len == 0 || len == 50, "observed partial batch of {}", len);
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(100);
        assert!(preview(&long).len() < 60);
        assert_eq!(preview("short"), "short");
    }
}
