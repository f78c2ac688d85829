//! URL fetch trait

use async_trait::async_trait;

use crate::Result;

/// URL fetch/extract interface
///
/// Implementations:
/// - `HttpPageFetcher` - fetches a page and reduces it to readable text
///
/// Failures are per URL and independent of other URLs in the same ingest
/// batch.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetch a URL and extract its readable text
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
