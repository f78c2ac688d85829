//! Prompt templates
//!
//! System instructions and the user prompt template for grounded
//! generation. The response must stay inside the retrieved context, so the
//! system prompt forbids answering from outside knowledge.

use chat_agent_core::Language;

/// Fixed system instructions for the assistant
pub const SYSTEM_PROMPT: &str = "\
You are SaudiLife, a helpful virtual assistant supporting Indian users with \
accurate and culturally aware information about living and working in Saudi \
Arabia: travel, employment, visa processes, local laws, and day-to-day life.

Ground every answer exclusively in the information inside the <context> \
block of the user message. Never guess or answer from outside knowledge. \
If the context does not contain the answer, reply with: \
\"I'm sorry, I don't have the information about that right now.\"

Keep the tone polite, respectful, and reassuring. Avoid technical jargon \
unless it appears in the context, and never mention that you are reading \
retrieved documents.";

/// User prompt template (`{context}`, `{query}`, `{language}`)
const USER_PROMPT_TEMPLATE: &str = "\
<context>
{context}
</context>

Answer the user query using only the information provided in the context.
User Query: {query}

Write the answer in {language}.";

/// User-facing text returned when the pipeline aborts
pub const FALLBACK_MESSAGE: &str =
    "We are facing some trouble, please try again in some time.";

/// Render the user prompt from retrieved context, the working-language
/// query, and the language the answer should be written in
pub fn render_user_prompt(context: &str, query: &str, language: Language) -> String {
    USER_PROMPT_TEMPLATE
        .replace("{context}", context)
        .replace("{query}", query)
        .replace("{language}", language.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_user_prompt() {
        let prompt = render_user_prompt(
            "Riyadh is the capital of Saudi Arabia.",
            "What is the capital?",
            Language::Hindi,
        );

        assert!(prompt.contains("<context>"));
        assert!(prompt.contains("Riyadh is the capital of Saudi Arabia."));
        assert!(prompt.contains("User Query: What is the capital?"));
        assert!(prompt.contains("in Hindi"));
        assert!(!prompt.contains("{context}"));
    }

    #[test]
    fn test_render_empty_context() {
        let prompt = render_user_prompt("", "Anything?", Language::English);
        assert!(prompt.contains("<context>\n\n</context>"));
    }
}
