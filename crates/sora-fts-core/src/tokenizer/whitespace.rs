//! Whitespace tokenizer for text that is already segmented.

use super::{TextTokenizer, Token};
use crate::error::Result;

/// Splits on Unicode whitespace and lowercases each term.
#[derive(Debug, Clone, Default)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl TextTokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut start: Option<usize> = None;

        for (idx, ch) in text.char_indices() {
            match (ch.is_whitespace(), start) {
                (true, Some(s)) => {
                    tokens.push(Token {
                        text: text[s..idx].to_lowercase(),
                        byte_start: s,
                        byte_end: idx,
                    });
                    start = None;
                }
                (false, None) => start = Some(idx),
                _ => {}
            }
        }
        if let Some(s) = start {
            tokens.push(Token {
                text: text[s..].to_lowercase(),
                byte_start: s,
                byte_end: text.len(),
            });
        }

        Ok(tokens)
    }
}
