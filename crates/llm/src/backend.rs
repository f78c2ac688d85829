//! Generation backend
//!
//! Talks to any OpenAI-compatible chat completion endpoint (Ollama,
//! vLLM, hosted providers). Non-streaming requests retry transient
//! failures with exponential backoff; streaming requests parse SSE
//! events and stop when the consumer goes away.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use chat_agent_core::{
    FinishReason, GenerateRequest, GenerateResponse, LanguageModel, Message, Result, StreamChunk,
    TokenUsage,
};

use crate::LlmError;

/// Backend configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API base URL, e.g. `http://localhost:11434/v1`
    pub endpoint: String,
    /// API key (optional)
    pub api_key: Option<String>,
    /// Model id
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/v1".to_string(),
            api_key: None,
            model: "qwen2.5:7b-instruct-q4_K_M".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
        }
    }
}

/// OpenAI-compatible generation backend
#[derive(Clone)]
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new backend
    pub fn new(config: OpenAiConfig) -> std::result::Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint)
    }

    fn wire_request<'a>(&'a self, request: &'a GenerateRequest, stream: bool) -> WireRequest<'a> {
        WireRequest {
            model: request.model.as_deref().unwrap_or(&self.config.model),
            messages: &request.messages,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            top_p: request.top_p,
            stream,
        }
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn execute_request(
        &self,
        request: &WireRequest<'_>,
    ) -> std::result::Result<WireResponse, LlmError> {
        let response = self
            .apply_auth(self.client.post(self.completions_url()))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // 5xx errors are retryable, 4xx are not
            if status.is_server_error() {
                return Err(LlmError::Network(format!("server error {}: {}", status, body)));
            }
            return Err(LlmError::Api(format!("{}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }
}

#[async_trait]
impl LanguageModel for OpenAiBackend {
    /// Generate a response, retrying transient failures with backoff
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let wire = self.wire_request(&request, false);

        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    attempt,
                    max = self.config.max_retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "generation request failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(&wire).await {
                Ok(response) => {
                    let choice = response
                        .choices
                        .into_iter()
                        .next()
                        .ok_or_else(|| LlmError::InvalidResponse("no choices".to_string()))?;

                    return Ok(GenerateResponse {
                        text: choice.message.content.unwrap_or_default(),
                        finish_reason: parse_finish_reason(choice.finish_reason.as_deref()),
                        usage: response.usage.map(|u| {
                            TokenUsage::new(u.prompt_tokens, u.completion_tokens)
                        }),
                    });
                }
                Err(e) if Self::is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Network("max retries exceeded".to_string()))
            .into())
    }

    fn generate_stream<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send + 'a>> {
        Box::pin(async_stream::stream! {
            let wire = self.wire_request(&request, true);

            let response = match self
                .apply_auth(self.client.post(self.completions_url()))
                .json(&wire)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    yield Err(LlmError::from(e).into());
                    return;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                yield Err(LlmError::Api(format!("{}: {}", status, body)).into());
                return;
            }

            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(part) = bytes.next().await {
                let part = match part {
                    Ok(part) => part,
                    Err(e) => {
                        yield Err(LlmError::from(e).into());
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&part));

                while let Some(pos) = buffer.find('\n') {
                    let line: String = buffer.drain(..=pos).collect();
                    match parse_sse_line(line.trim()) {
                        SseEvent::Delta { text, finish_reason } => {
                            if !text.is_empty() {
                                yield Ok(StreamChunk::text(text));
                            }
                            if let Some(reason) = finish_reason {
                                yield Ok(StreamChunk::final_chunk(reason));
                                return;
                            }
                        }
                        SseEvent::Done => {
                            yield Ok(StreamChunk::final_chunk(FinishReason::Stop));
                            return;
                        }
                        SseEvent::Skip => {}
                    }
                }
            }

            // Stream ended without an explicit terminator
            yield Ok(StreamChunk::final_chunk(FinishReason::Stop));
        })
    }

    async fn is_available(&self) -> bool {
        self.apply_auth(self.client.get(format!("{}/models", self.config.endpoint)))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// One parsed server-sent event line
enum SseEvent {
    Delta {
        text: String,
        finish_reason: Option<FinishReason>,
    },
    Done,
    Skip,
}

fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.strip_prefix("data:") else {
        return SseEvent::Skip;
    };
    let data = data.trim();

    if data == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<WireStreamChunk>(data) {
        Ok(chunk) => {
            let Some(choice) = chunk.choices.into_iter().next() else {
                return SseEvent::Skip;
            };
            SseEvent::Delta {
                text: choice.delta.content.unwrap_or_default(),
                finish_reason: choice
                    .finish_reason
                    .as_deref()
                    .map(|r| parse_finish_reason(Some(r))),
            }
        }
        Err(_) => SseEvent::Skip,
    }
}

fn parse_finish_reason(reason: Option<&str>) -> FinishReason {
    match reason {
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        _ => FinishReason::Stop,
    }
}

// Wire types for the chat completion API

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireStreamChunk {
    choices: Vec<WireStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChoice {
    #[serde(default)]
    delta: WireDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
}
