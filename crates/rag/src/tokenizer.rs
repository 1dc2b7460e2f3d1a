//! Language-aware tokenization for lexical scoring
//!
//! The primary mode segments on Unicode word boundaries and merges
//! adjacent CJK fragments into script runs, which approximates word units
//! for Japanese text without a morphological dictionary. The character-
//! class splitter is the required degradation path: it is selectable by
//! configuration and also kicks in automatically whenever the primary
//! segmenter produces nothing for non-empty input.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Hiragana / katakana / kanji / latin-digit runs
static CHAR_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Hiragana}]+|[\p{Katakana}ー]+|[\p{Han}]+|[a-zA-Z0-9]+|[０-９]+")
        .expect("char-class pattern is valid")
});

/// Particles and copulas that carry no lexical signal
static STOP_WORDS: &[&str] = &[
    "です", "ます", "である", "だ", "で", "に", "を", "が", "は", "の", "と", "から", "まで",
    "より", "て", "た", "し", "ば", "ん",
];

/// Which splitter drives tokenization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerMode {
    /// Unicode word boundaries with CJK run merging
    #[default]
    Segmenter,
    /// Character-class runs only (degraded mode)
    CharClass,
}

impl From<helpdesk_config::TokenizerKind> for TokenizerMode {
    fn from(kind: helpdesk_config::TokenizerKind) -> Self {
        match kind {
            helpdesk_config::TokenizerKind::Segmenter => TokenizerMode::Segmenter,
            helpdesk_config::TokenizerKind::CharClass => TokenizerMode::CharClass,
        }
    }
}

/// Tokenizer shared by document and query scoring.
///
/// Both sides of a lexical comparison must use the same instance so the
/// token space matches.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    mode: TokenizerMode,
    stop_words: HashSet<&'static str>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerMode::default())
    }
}

impl Tokenizer {
    pub fn new(mode: TokenizerMode) -> Self {
        Self {
            mode,
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Degraded-mode tokenizer
    pub fn char_class() -> Self {
        Self::new(TokenizerMode::CharClass)
    }

    /// Split text into scoring tokens.
    ///
    /// Stop words and single-character tokens are dropped; if filtering
    /// removes everything, the unfiltered split is returned so short
    /// queries still score.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let raw = match self.mode {
            TokenizerMode::Segmenter => {
                let segmented = Self::segment(text);
                if segmented.is_empty() && !text.trim().is_empty() {
                    tracing::debug!("segmenter produced no tokens, using char-class fallback");
                    Self::char_class_split(text)
                } else {
                    segmented
                }
            }
            TokenizerMode::CharClass => Self::char_class_split(text),
        };

        let filtered: Vec<String> = raw
            .iter()
            .filter(|t| t.chars().count() > 1 && !self.stop_words.contains(t.as_str()))
            .cloned()
            .collect();

        if filtered.is_empty() {
            raw
        } else {
            filtered
        }
    }

    /// Unicode word split with CJK run merging
    fn segment(text: &str) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();

        for word in text.unicode_words() {
            let class = Self::script_class(word);
            let merged = match (tokens.last_mut(), class) {
                (Some(prev), Some(class))
                    if Self::script_class(prev) == Some(class) && class != Script::Latin =>
                {
                    // Adjacent fragments of one CJK script form one run
                    prev.push_str(word);
                    true
                }
                _ => false,
            };
            if !merged {
                tokens.push(word.to_string());
            }
        }

        tokens
    }

    fn char_class_split(text: &str) -> Vec<String> {
        CHAR_CLASS
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn script_class(token: &str) -> Option<Script> {
        let c = token.chars().next()?;
        if ('\u{3040}'..='\u{309F}').contains(&c) {
            Some(Script::Hiragana)
        } else if ('\u{30A0}'..='\u{30FF}').contains(&c) {
            Some(Script::Katakana)
        } else if ('\u{4E00}'..='\u{9FFF}').contains(&c) {
            Some(Script::Han)
        } else if c.is_ascii_alphanumeric() {
            Some(Script::Latin)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Hiragana,
    Katakana,
    Han,
    Latin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_class_splits_by_script() {
        let tokenizer = Tokenizer::char_class();
        let tokens = tokenizer.tokenize("チェックインは15時からです");
        assert!(tokens.contains(&"チェックイン".to_string()));
        assert!(tokens.contains(&"15".to_string()));
        // 「は」「です」 are filtered as stop words / single chars
        assert!(!tokens.contains(&"は".to_string()));
    }

    #[test]
    fn test_segmenter_merges_kanji_runs() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("利用単位について");
        assert!(tokens.contains(&"利用単位".to_string()), "tokens: {:?}", tokens);
    }

    #[test]
    fn test_ascii_text() {
        let tokenizer = Tokenizer::default();
        let tokens = tokenizer.tokenize("check-in time is 15:00");
        assert!(tokens.contains(&"check".to_string()));
        assert!(tokens.contains(&"time".to_string()));
    }

    #[test]
    fn test_empty_input() {
        let tokenizer = Tokenizer::default();
        assert!(tokenizer.tokenize("").is_empty());
        assert!(tokenizer.tokenize("   ").is_empty());
    }

    #[test]
    fn test_same_text_same_tokens() {
        let tokenizer = Tokenizer::default();
        let a = tokenizer.tokenize("料金は2000円です");
        let b = tokenizer.tokenize("料金は2000円です");
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_query_survives_filtering() {
        let tokenizer = Tokenizer::default();
        // Single-character tokens only; the unfiltered split must come back
        let tokens = tokenizer.tokenize("絵");
        assert_eq!(tokens, vec!["絵".to_string()]);
    }
}
