//! Chat Orchestrator
//!
//! Runs the fixed pipeline for one request: input resolution (audio
//! transcription or language detection), query normalization into the
//! working language, context retrieval, generation, and response
//! localization back into the user's language. The chain is strictly
//! linear; stages never reorder.
//!
//! Failure policy: retrieval problems downgrade to an empty context, any
//! other stage failure aborts the run and becomes a `ChatResponse` with
//! the error flag set. No external-service error escapes to the caller.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;

use chat_agent_config::prompts::FALLBACK_MESSAGE;
use chat_agent_config::PipelineSettings;
use chat_agent_core::{
    ChatInput, ChatRequest, ChatResponse, ChatStreamEvent, Error, GenerateRequest, Language,
    LanguageModel, Result, SpeechToText, Translator,
};
use chat_agent_llm::PromptBuilder;
use chat_agent_rag::{KnowledgeStore, RetrievedContext};

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// The single internal language used for retrieval and generation
    pub working_language: Language,
    /// Number of context chunks retrieved per query
    pub top_k: usize,
    /// Per-stage timeouts
    pub transcription_timeout: Duration,
    pub translation_timeout: Duration,
    pub retrieval_timeout: Duration,
    pub generation_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            working_language: Language::English,
            top_k: 3,
            transcription_timeout: Duration::from_secs(30),
            translation_timeout: Duration::from_secs(10),
            retrieval_timeout: Duration::from_secs(5),
            generation_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&PipelineSettings> for OrchestratorConfig {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            working_language: settings.working_language,
            top_k: settings.top_k,
            transcription_timeout: Duration::from_millis(settings.transcription_timeout_ms),
            translation_timeout: Duration::from_millis(settings.translation_timeout_ms),
            retrieval_timeout: Duration::from_millis(settings.retrieval_timeout_ms),
            generation_timeout: Duration::from_millis(settings.generation_timeout_ms),
        }
    }
}

/// Chat pipeline orchestrator
///
/// Cheap to clone; each inbound request drives its own pipeline run with
/// no shared mutable per-request state. The knowledge store is the one
/// process-wide shared resource.
#[derive(Clone)]
pub struct ChatOrchestrator {
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    llm: Arc<dyn LanguageModel>,
    store: Arc<KnowledgeStore>,
    config: OrchestratorConfig,
}

impl ChatOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        translator: Arc<dyn Translator>,
        llm: Arc<dyn LanguageModel>,
        store: Arc<KnowledgeStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            stt,
            translator,
            llm,
            store,
            config,
        }
    }

    /// Run the full pipeline to completion and return one response
    pub async fn handle(&self, request: ChatRequest) -> ChatResponse {
        tracing::info!(
            request_id = %request.request_id,
            audio = request.input.is_audio(),
            "processing chat request"
        );

        match self.respond(&request).await {
            Ok(text) => {
                tracing::info!(request_id = %request.request_id, "chat request complete");
                ChatResponse::success(text)
            }
            Err(e) => {
                tracing::error!(request_id = %request.request_id, error = %e, "pipeline run failed");
                ChatResponse::failure(FALLBACK_MESSAGE, e.to_string())
            }
        }
    }

    /// Run the pipeline with the generation stage streamed
    ///
    /// Fragments are forwarded in arrival order, followed by exactly one
    /// `Final` event holding the assembled, localized text. Dropping the
    /// returned stream cancels the run: no further fragments or final
    /// event are produced and the generation call is released. A failure
    /// before generation yields a single `Final` error event; a failure
    /// mid-stream truncates the stream without a final event.
    pub fn handle_stream(&self, request: ChatRequest) -> ReceiverStream<ChatStreamEvent> {
        let (tx, rx) = mpsc::channel(32);
        let this = self.clone();
        tokio::spawn(async move {
            this.stream_events(request, tx).await;
        });
        ReceiverStream::new(rx)
    }

    /// Stages 1-6, non-streaming
    async fn respond(&self, request: &ChatRequest) -> Result<String> {
        let (text, detected) = self.resolve_input(request).await?;
        let working_query = self.normalize_query(&request.request_id, &text, detected).await?;
        let context = self.retrieve_context(&request.request_id, &working_query).await;
        let generate_request = self.build_generate_request(&context, &working_query);

        let generated = timeout(self.config.generation_timeout, self.llm.generate(generate_request))
            .await
            .map_err(|_| Error::Generation("generation timed out".to_string()))??;

        self.localize(&request.request_id, generated.text, detected).await
    }

    /// Stages 1-4 with fragment forwarding, then localization of the
    /// accumulated text
    async fn stream_events(&self, request: ChatRequest, tx: mpsc::Sender<ChatStreamEvent>) {
        let request_id = request.request_id.clone();

        let prepared = async {
            let (text, detected) = self.resolve_input(&request).await?;
            let working_query = self.normalize_query(&request_id, &text, detected).await?;
            Ok::<_, Error>((working_query, detected))
        }
        .await;

        let (working_query, detected) = match prepared {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "pipeline run failed before generation");
                let _ = tx
                    .send(ChatStreamEvent::Final(ChatResponse::failure(
                        FALLBACK_MESSAGE,
                        e.to_string(),
                    )))
                    .await;
                return;
            }
        };

        if tx.is_closed() {
            tracing::info!(request_id = %request_id, "caller cancelled before generation");
            return;
        }

        let context = self.retrieve_context(&request_id, &working_query).await;
        let generate_request = self
            .build_generate_request(&context, &working_query)
            .with_streaming(true);

        let mut fragments = self.llm.generate_stream(generate_request);
        let mut assembled = String::new();

        loop {
            match timeout(self.config.generation_timeout, fragments.next()).await {
                Err(_) => {
                    tracing::error!(request_id = %request_id, "generation timed out mid-stream, truncating");
                    return;
                }
                Ok(None) => break,
                Ok(Some(Err(e))) => {
                    tracing::error!(request_id = %request_id, error = %e, "generation failed mid-stream, truncating");
                    return;
                }
                Ok(Some(Ok(chunk))) => {
                    if !chunk.delta.is_empty() {
                        assembled.push_str(&chunk.delta);
                        if tx
                            .send(ChatStreamEvent::Fragment(chunk.delta))
                            .await
                            .is_err()
                        {
                            // Dropping `fragments` releases the generation call
                            tracing::info!(request_id = %request_id, "caller cancelled, stopping stream");
                            return;
                        }
                    }
                    if chunk.is_final {
                        break;
                    }
                }
            }
        }

        match self.localize(&request_id, assembled, detected).await {
            Ok(final_text) => {
                let _ = tx
                    .send(ChatStreamEvent::Final(ChatResponse::success(final_text)))
                    .await;
            }
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "localization failed after streaming, truncating");
            }
        }
    }

    /// Stage 1: transcribe audio, or detect the language of a text query
    async fn resolve_input(&self, request: &ChatRequest) -> Result<(String, Language)> {
        match &request.input {
            ChatInput::Audio(audio) => {
                let transcription =
                    timeout(self.config.transcription_timeout, self.stt.transcribe(audio))
                        .await
                        .map_err(|_| Error::Transcription("transcription timed out".to_string()))??;
                tracing::info!(
                    request_id = %request.request_id,
                    language = transcription.language.code(),
                    "transcribed audio input"
                );
                Ok((transcription.text, transcription.language))
            }
            ChatInput::Text(text) => {
                let detected = Language::detect(text).unwrap_or(self.config.working_language);
                tracing::info!(
                    request_id = %request.request_id,
                    language = detected.code(),
                    "identified query language"
                );
                Ok((text.clone(), detected))
            }
        }
    }

    /// Stage 2: translate the query into the working language
    ///
    /// A no-op when the detected language already matches; translating
    /// identical languages would be a wasted external call.
    async fn normalize_query(
        &self,
        request_id: &str,
        text: &str,
        detected: Language,
    ) -> Result<String> {
        if detected == self.config.working_language {
            tracing::debug!(request_id = %request_id, "query already in working language");
            return Ok(text.to_string());
        }

        let translated = timeout(
            self.config.translation_timeout,
            self.translator
                .translate(text, detected, self.config.working_language),
        )
        .await
        .map_err(|_| Error::Translation("translation timed out".to_string()))??;

        tracing::info!(
            request_id = %request_id,
            from = detected.code(),
            to = self.config.working_language.code(),
            "query normalized"
        );
        Ok(translated)
    }

    /// Stage 3: retrieve context, downgrading any failure to empty context
    async fn retrieve_context(&self, request_id: &str, query: &str) -> RetrievedContext {
        match timeout(
            self.config.retrieval_timeout,
            self.store.search(query, self.config.top_k),
        )
        .await
        {
            Ok(Ok(context)) => {
                tracing::info!(request_id = %request_id, hits = context.hits.len(), "context retrieved");
                context
            }
            Ok(Err(e)) => {
                tracing::warn!(request_id = %request_id, error = %e, "context retrieval failed, continuing without context");
                RetrievedContext::default()
            }
            Err(_) => {
                tracing::warn!(request_id = %request_id, "context retrieval timed out, continuing without context");
                RetrievedContext::default()
            }
        }
    }

    /// Stage 4 input: system instructions + context + working-language query
    fn build_generate_request(
        &self,
        context: &RetrievedContext,
        working_query: &str,
    ) -> GenerateRequest {
        let messages = PromptBuilder::new()
            .with_context(context.joined_text())
            .build(working_query, self.config.working_language);
        GenerateRequest::from_messages(messages)
    }

    /// Stage 5: translate the result back into the user's language
    async fn localize(&self, request_id: &str, text: String, target: Language) -> Result<String> {
        if target == self.config.working_language {
            return Ok(text);
        }

        let localized = timeout(
            self.config.translation_timeout,
            self.translator
                .translate(&text, self.config.working_language, target),
        )
        .await
        .map_err(|_| Error::Translation("translation timed out".to_string()))??;

        tracing::info!(request_id = %request_id, to = target.code(), "response localized");
        Ok(localized)
    }
}
