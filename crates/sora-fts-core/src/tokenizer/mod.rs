//! Tokenizers feeding the full-text index.
//!
//! The same tokenizer instance is used at index time and at query time, so
//! both sides of a BM25 comparison see identical terms.
//!
//! This module provides:
//! - The `TextTokenizer` seam and the typed `Token` record
//! - A lindera-backed Japanese tokenizer (IPADIC, NFKC, lowercase, numeral compounds)
//! - A whitespace tokenizer for plain space-delimited text

mod config;
mod japanese;
mod whitespace;

pub use config::{FilterConfig, TokenizerConfig};
pub use japanese::LinderaTokenizer;
pub use whitespace::WhitespaceTokenizer;

use crate::error::Result;
use std::sync::Arc;
use tracing::info;

/// A single token produced by a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text after all filters ran.
    pub text: String,
    /// Byte offset of the token in the (character-filtered) input.
    pub byte_start: usize,
    pub byte_end: usize,
}

/// Splits text into search terms.
pub trait TextTokenizer: Send + Sync {
    /// Tokenize `text` into typed tokens.
    fn tokenize(&self, text: &str) -> Result<Vec<Token>>;

    /// Tokenize `text` and join the token texts with single spaces.
    ///
    /// Empty tokens are dropped, so the result never has doubled spaces.
    fn tokenize_joined(&self, text: &str) -> Result<String> {
        let tokens = self.tokenize(text)?;
        Ok(join_tokens(&tokens))
    }
}

/// Join token texts with single spaces, skipping empty tokens.
pub fn join_tokens(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| token.text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the configured Japanese tokenizer.
///
/// Dictionary loading is CPU bound, so it runs on the blocking pool.
pub async fn initialize(config: TokenizerConfig) -> Result<Arc<dyn TextTokenizer>> {
    let tokenizer = tokio::task::spawn_blocking(move || LinderaTokenizer::new(&config)).await??;
    info!("Lindera tokenizer initialized");
    Ok(Arc::new(tokenizer))
}
