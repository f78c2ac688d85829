//! Error types for the chat agent

use thiserror::Error;

/// Result alias used across all chat agent crates
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error taxonomy
///
/// Stage errors map onto pipeline policy: `Input` is rejected before the
/// pipeline starts, `Retrieval` is downgraded to empty context by the
/// orchestrator, everything else aborts the request and is converted into
/// an error response.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed request (both or neither of query text and audio present)
    #[error("invalid input: {0}")]
    Input(String),

    #[error("transcription error: {0}")]
    Transcription(String),

    #[error("translation error: {0}")]
    Translation(String),

    /// Never surfaced to callers directly
    #[error("retrieval error: {0}")]
    Retrieval(String),

    #[error("generation error: {0}")]
    Generation(String),

    /// Per-URL ingestion failure, independent of other URLs in the batch
    #[error("fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a per-URL fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Input("both query and audio present".to_string());
        assert!(err.to_string().contains("invalid input"));

        let err = Error::fetch("http://example.com", "timed out");
        assert!(err.to_string().contains("http://example.com"));
        assert!(err.to_string().contains("timed out"));
    }
}
