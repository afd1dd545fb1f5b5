//! Centralized configuration for the search pipeline.
//!
//! Constants live in unit structs; the runtime-tunable part is `AppConfig`,
//! which can be loaded from a JSON file.

use crate::corpus;
use crate::error::{Result, SearchError};
use crate::index::StoreConfig;
use crate::tokenizer::TokenizerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application-level constants.
pub struct AppInfo;

impl AppInfo {
    pub const APP_NAME: &'static str = "Sora FTS";
    pub const TITLE: &'static str = "SQLite FTS5 with Lindera - Demo App";
}

/// Defaults for the HTTP front-end.
pub struct ServerDefaults;

impl ServerDefaults {
    pub const HOST: &'static str = "127.0.0.1";
    pub const PORT: u16 = 0;
    pub const PORT_ANNOUNCE_PREFIX: &'static str = "SERVER_PORT=";
}

/// Defaults for the search pipeline.
pub struct PipelineDefaults;

impl PipelineDefaults {
    pub const INITIAL_QUERY: &'static str = "センシティブ";
    /// Decimal places used when rendering scores.
    pub const SCORE_PRECISION: usize = 4;
}

/// Runtime configuration for a `SearchApp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tokenizer: TokenizerConfig,
    pub store: StoreConfig,
    /// Documents to index. `None` uses the built-in corpus.
    pub corpus: Option<Vec<String>>,
    pub initial_query: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            store: StoreConfig::default(),
            corpus: None,
            initial_query: PipelineDefaults::INITIAL_QUERY.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration overrides from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| SearchError::io_with_path(e, path))?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that can never produce a usable store.
    pub fn validate(&self) -> Result<()> {
        if let Some(docs) = &self.corpus {
            if docs.is_empty() {
                return Err(SearchError::Config {
                    message: "corpus must contain at least one document".to_string(),
                });
            }
        }
        self.store.validate()
    }

    /// The documents that will be loaded into the store.
    pub fn documents(&self) -> Vec<String> {
        match &self.corpus {
            Some(docs) => docs.clone(),
            None => corpus::default_documents(),
        }
    }
}
