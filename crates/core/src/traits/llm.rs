//! Language Model trait

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::{GenerateRequest, GenerateResponse, Result, StreamChunk};

/// Language Model interface
///
/// Implementations:
/// - `OpenAiBackend` - any OpenAI-compatible chat completion endpoint
///
/// # Example
///
/// ```ignore
/// let llm: Arc<dyn LanguageModel> = Arc::new(OpenAiBackend::new(config)?);
/// let request = GenerateRequest::new("You are a helpful assistant")
///     .with_user_message("What documents do I need for an Iqama?");
/// let response = llm.generate(request).await?;
/// println!("{}", response.text);
/// ```
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Generate completion
    ///
    /// # Arguments
    /// * `request` - Generation request with messages and parameters
    ///
    /// # Returns
    /// Generated response with text and metadata
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Stream fragments as generated
    ///
    /// Lower latency than `generate()` as fragments are yielded
    /// incrementally. The stream is finite and non-restartable; dropping it
    /// cancels the underlying call.
    fn generate_stream<'a>(
        &'a self,
        request: GenerateRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send + 'a>>;

    /// Check if model is available
    async fn is_available(&self) -> bool;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
