//! Chat request and response types
//!
//! The boundary layer deserializes the loose `{name?, query?, audio?}` wire
//! shape into [`RawChatRequest`] and converts it into a validated
//! [`ChatRequest`] before the orchestrator ever runs. The query/audio
//! ambiguity is resolved at the type level by [`ChatInput`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Exactly one input payload per request
#[derive(Debug, Clone, PartialEq)]
pub enum ChatInput {
    /// A typed query
    Text(String),
    /// Raw audio bytes to be transcribed
    Audio(Vec<u8>),
}

impl ChatInput {
    /// Check if this is an audio input
    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio(_))
    }
}

/// A validated chat request
///
/// Immutable for the lifetime of one pipeline run.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Optional display name of the user
    pub name: Option<String>,
    pub input: ChatInput,
    /// Correlation id threaded through every log line of the run
    pub request_id: String,
}

impl ChatRequest {
    /// Create a text request
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            name: None,
            input: ChatInput::Text(query.into()),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an audio request
    pub fn audio(bytes: Vec<u8>) -> Self {
        Self {
            name: None,
            input: ChatInput::Audio(bytes),
            request_id: Uuid::new_v4().to_string(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Unvalidated request shape as it arrives from the boundary layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChatRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub audio: Option<Vec<u8>>,
}

impl TryFrom<RawChatRequest> for ChatRequest {
    type Error = Error;

    fn try_from(raw: RawChatRequest) -> Result<Self> {
        let input = match (raw.query, raw.audio) {
            (Some(_), Some(_)) => {
                return Err(Error::Input(
                    "both query and audio present, expected exactly one".to_string(),
                ))
            }
            (Some(query), None) => {
                if query.trim().is_empty() {
                    return Err(Error::Input("query cannot be empty".to_string()));
                }
                ChatInput::Text(query)
            }
            (None, Some(audio)) => {
                if audio.is_empty() {
                    return Err(Error::Input("audio payload cannot be empty".to_string()));
                }
                ChatInput::Audio(audio)
            }
            (None, None) => {
                return Err(Error::Input(
                    "either query or audio must be present".to_string(),
                ))
            }
        };

        Ok(Self {
            name: raw.name,
            input,
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

/// Terminal artifact of one orchestration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Final text in the user's original language
    pub response: String,
    /// True when the pipeline aborted before producing a usable answer
    pub error: bool,
    /// Error detail for the boundary layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChatResponse {
    /// Successful response
    pub fn success(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: false,
            message: None,
        }
    }

    /// Failed response with a user-facing text and an error detail
    pub fn failure(response: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            error: true,
            message: Some(detail.into()),
        }
    }
}

/// One event of a streaming response
///
/// Fragments arrive in generation order; `Final` is sent at most once and
/// always last.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStreamEvent {
    Fragment(String),
    Final(ChatResponse),
}
