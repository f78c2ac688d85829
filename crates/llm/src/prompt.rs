//! Prompt building
//!
//! Assembles the fixed system instructions, retrieved context, and the
//! working-language query into the message list sent to the model.

use chat_agent_core::{Language, Message};
use chat_agent_config::prompts;

/// Prompt builder for grounded answers
pub struct PromptBuilder {
    system_prompt: String,
    context: String,
}

impl PromptBuilder {
    /// Create a builder with the default system instructions
    pub fn new() -> Self {
        Self {
            system_prompt: prompts::SYSTEM_PROMPT.to_string(),
            context: String::new(),
        }
    }

    /// Override the system instructions
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Set the retrieved context
    ///
    /// An empty context is allowed; the model is instructed to say it does
    /// not have the information rather than guess.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Build the message list for a query, naming the answer language
    pub fn build(self, query: &str, answer_language: Language) -> Vec<Message> {
        vec![
            Message::system(self.system_prompt),
            Message::user(prompts::render_user_prompt(
                &self.context,
                query,
                answer_language,
            )),
        ]
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
