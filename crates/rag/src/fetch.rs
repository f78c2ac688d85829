//! URL fetching and readable-text extraction

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use chat_agent_core::{PageFetcher, Result};

use crate::RagError;

/// Fetch configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent sent with fetch requests
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("chat-agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP page fetcher
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Create a new fetcher
    pub fn new(config: FetchConfig) -> std::result::Result<Self, RagError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| RagError::Store(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            RagError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        if !response.status().is_success() {
            return Err(RagError::Fetch {
                url: url.to_string(),
                message: format!("status {}", response.status()),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| RagError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let text = extract_text(&body);
        if text.is_empty() {
            return Err(RagError::Fetch {
                url: url.to_string(),
                message: "no readable text".to_string(),
            }
            .into());
        }

        Ok(text)
    }
}

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>")
        .expect("valid regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Reduce an HTML document to readable text
///
/// Drops script/style blocks, strips tags, decodes common entities, and
/// collapses whitespace. Plain text passes through unchanged.
pub fn extract_text(html: &str) -> String {
    let without_blocks = SCRIPT_STYLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_blocks, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    WHITESPACE.replace_all(&decoded, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_strips_tags() {
        let html = "<html><body><h1>Visa rules</h1><p>Apply <b>early</b>.</p></body></html>";
        assert_eq!(extract_text(html), "Visa rules Apply early .");
    }

    #[test]
    fn test_extract_drops_scripts_and_styles() {
        let html = r#"<head><style>p { color: red; }</style>
            <script>alert("hi");</script></head><body><p>Visible text.</p></body>"#;
        assert_eq!(extract_text(html), "Visible text.");
    }

    #[test]
    fn test_extract_decodes_entities() {
        assert_eq!(extract_text("Fish &amp; chips"), "Fish & chips");
    }

    #[test]
    fn test_extract_plain_text_passthrough() {
        assert_eq!(extract_text("Just plain text."), "Just plain text.");
    }

    #[test]
    fn test_extract_empty() {
        assert_eq!(extract_text("<script>only()</script>"), "");
    }
}
