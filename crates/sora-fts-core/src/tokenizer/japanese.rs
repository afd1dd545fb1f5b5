//! Lindera-backed Japanese tokenizer.

use super::{TextTokenizer, Token, TokenizerConfig};
use crate::error::{Result, SearchError};
use crate::pipeline::StageKind;
use lindera::dictionary::DictionaryKind;
use lindera::mode::{Mode, Penalty};
use lindera::tokenizer::Tokenizer;
use serde_json::{json, Value};
use tracing::debug;

/// Japanese morphological tokenizer with the configured filter chain.
pub struct LinderaTokenizer {
    inner: Tokenizer,
    config: TokenizerConfig,
}

impl std::fmt::Debug for LinderaTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinderaTokenizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn init_error(err: impl std::fmt::Display) -> SearchError {
    SearchError::initialization(StageKind::Tokenizer, err)
}

fn dictionary_kind(kind: &str) -> Result<DictionaryKind> {
    match kind {
        "ipadic" => Ok(DictionaryKind::IPADIC),
        other => Err(init_error(format!("unsupported dictionary kind: {}", other))),
    }
}

fn segmenter_mode(mode: &str) -> Result<Mode> {
    match mode {
        "normal" => Ok(Mode::Normal),
        "decompose" => Ok(Mode::Decompose(Penalty::default())),
        other => Err(init_error(format!("unsupported tokenizer mode: {}", other))),
    }
}

/// The complete lindera configuration for `config`.
///
/// Built from scratch so that no config file named by the environment can add
/// filters to the chain.
fn lindera_config(config: &TokenizerConfig) -> Result<Value> {
    dictionary_kind(&config.dictionary_kind)?;
    let mode = serde_json::to_value(segmenter_mode(&config.mode)?).map_err(init_error)?;

    for filter in &config.character_filters {
        debug!("Character filter: {}", filter.kind);
    }
    for filter in &config.token_filters {
        debug!("Token filter: {}", filter.kind);
    }

    Ok(json!({
        "segmenter": {
            "mode": mode,
            "dictionary": { "kind": config.dictionary_kind },
        },
        "character_filters": config.character_filters,
        "token_filters": config.token_filters,
    }))
}

impl LinderaTokenizer {
    /// Build the tokenizer, loading the embedded dictionary.
    ///
    /// Unknown filters and malformed filter arguments are rejected here.
    pub fn new(config: &TokenizerConfig) -> Result<Self> {
        let lindera = lindera_config(config)?;
        let inner = Tokenizer::from_config(&lindera).map_err(init_error)?;

        Ok(Self {
            inner,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }
}

impl TextTokenizer for LinderaTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>> {
        let tokens = self
            .inner
            .tokenize(text)
            .map_err(|e| SearchError::Tokenizer {
                message: e.to_string(),
            })?;

        Ok(tokens
            .into_iter()
            .map(|token| Token {
                text: token.text.to_string(),
                byte_start: token.byte_start,
                byte_end: token.byte_end,
            })
            .collect())
    }
}
