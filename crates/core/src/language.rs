//! Language definitions for the supported conversation languages
//!
//! The pipeline works internally in a single pivot language (English by
//! default) and accepts queries in any of the supported languages.

use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Malayalam,
}

impl Language {
    /// Get ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Malayalam => "ml",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Malayalam => "Malayalam",
        }
    }

    /// Get script used by this language
    pub fn script(&self) -> Script {
        match self {
            Self::English => Script::Latin,
            Self::Hindi => Script::Devanagari,
            Self::Malayalam => Script::Malayalam,
        }
    }

    /// Parse from string (case-insensitive, accepts codes and names)
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "en" | "eng" | "english" => Some(Self::English),
            "hi" | "hin" | "hindi" => Some(Self::Hindi),
            "ml" | "mal" | "malayalam" => Some(Self::Malayalam),
            _ => None,
        }
    }

    /// Detect the dominant language of a text by script frequency
    ///
    /// Returns `None` when the text contains no characters from any
    /// supported script; callers fall back to the configured pivot.
    pub fn detect(text: &str) -> Option<Self> {
        Script::detect(text).map(|script| match script {
            Script::Latin => Self::English,
            Script::Devanagari => Self::Hindi,
            Script::Malayalam => Self::Malayalam,
        })
    }

    /// Get all supported languages
    pub fn all() -> &'static [Language] {
        &[Self::English, Self::Hindi, Self::Malayalam]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Script systems used by the supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    Latin,
    Devanagari,
    Malayalam,
}

impl Script {
    /// Get Unicode range for this script (letters only for Latin)
    pub fn unicode_range(&self) -> (u32, u32) {
        match self {
            Self::Latin => (0x0041, 0x007A),
            Self::Devanagari => (0x0900, 0x097F),
            Self::Malayalam => (0x0D00, 0x0D7F),
        }
    }

    /// Check if a character belongs to this script
    pub fn contains_char(&self, c: char) -> bool {
        let code = c as u32;
        let (start, end) = self.unicode_range();
        code >= start && code <= end
    }

    /// Detect script from text (returns most frequent script)
    pub fn detect(text: &str) -> Option<Self> {
        let mut counts = [0usize; 3];
        let scripts = [Self::Latin, Self::Devanagari, Self::Malayalam];

        for c in text.chars() {
            for (i, script) in scripts.iter().enumerate() {
                if script.contains_char(c) {
                    counts[i] += 1;
                    break;
                }
            }
        }

        // Earlier script wins ties so detection is deterministic
        let (best, count) = counts
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;

        if *count == 0 {
            None
        } else {
            Some(scripts[best])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_code() {
        assert_eq!(Language::English.code(), "en");
        assert_eq!(Language::Hindi.code(), "hi");
        assert_eq!(Language::Malayalam.code(), "ml");
    }

    #[test]
    fn test_language_script() {
        assert_eq!(Language::English.script(), Script::Latin);
        assert_eq!(Language::Hindi.script(), Script::Devanagari);
        assert_eq!(Language::Malayalam.script(), Script::Malayalam);
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str_loose("hi"), Some(Language::Hindi));
        assert_eq!(Language::from_str_loose("Hindi"), Some(Language::Hindi));
        assert_eq!(Language::from_str_loose("ML"), Some(Language::Malayalam));
        assert_eq!(Language::from_str_loose("unknown"), None);
    }

    #[test]
    fn test_detect_english() {
        assert_eq!(Language::detect("Hello, how are you?"), Some(Language::English));
    }

    #[test]
    fn test_detect_hindi() {
        assert_eq!(Language::detect("नमस्ते, आप कैसे हैं?"), Some(Language::Hindi));
    }

    #[test]
    fn test_detect_malayalam() {
        assert_eq!(
            Language::detect("നമസ്കാരം, നിങ്ങൾ എങ്ങനെയുണ്ട്?"),
            Some(Language::Malayalam)
        );
    }

    #[test]
    fn test_detect_mixed_picks_dominant() {
        // Mostly Devanagari with a couple of Latin letters
        assert_eq!(Language::detect("ok नमस्ते आप कैसे हैं"), Some(Language::Hindi));
    }

    #[test]
    fn test_detect_no_script() {
        assert_eq!(Language::detect("1234 !?"), None);
        assert_eq!(Language::detect(""), None);
    }
}
