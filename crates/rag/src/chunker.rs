//! Sentence-aware text chunking
//!
//! Splits documents into bounded-size chunks on sentence boundaries,
//! carrying a character overlap from the previous chunk so retrieval does
//! not lose context at chunk edges.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Configuration for text chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum chunk size in characters
    pub max_chars: usize,
    /// Characters of trailing overlap carried into the next chunk
    pub overlap_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: 500,
            overlap_chars: 100,
        }
    }
}

/// Sentence-aware chunker
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Split a document into bounded-size chunks
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for sentence in sentences {
            let sentence_len = sentence.chars().count();

            if current_len + sentence_len > self.config.max_chars && !current.is_empty() {
                chunks.push(current.trim().to_string());

                // Seed the next chunk with the tail of the previous one
                current = if self.config.overlap_chars > 0 {
                    let tail = tail_chars(&current, self.config.overlap_chars);
                    format!("{} {}", tail.trim(), sentence)
                } else {
                    sentence.clone()
                };
                current_len = current.chars().count();
            } else {
                if !current.is_empty() {
                    current.push(' ');
                    current_len += 1;
                }
                current.push_str(&sentence);
                current_len += sentence_len;
            }
        }

        if !current.trim().is_empty() {
            chunks.push(current.trim().to_string());
        }

        chunks
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

/// Split text into sentences on terminator characters
///
/// Handles Latin terminators plus the Devanagari danda used in Hindi.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for grapheme in text.graphemes(true) {
        current.push_str(grapheme);
        let c = grapheme.chars().next().unwrap_or(' ');
        if matches!(c, '.' | '?' | '!' | '।' | '॥') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

/// Last `n` characters of a string, grapheme-safe
fn tail_chars(text: &str, n: usize) -> &str {
    let char_count = text.chars().count();
    if char_count <= n {
        return text;
    }
    let skip = char_count - n;
    let byte_start = text
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &text[byte_start..]
}
