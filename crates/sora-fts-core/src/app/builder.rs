//! Builder for configuring SearchApp initialization.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::index::StoreConfig;
use crate::tokenizer::{TextTokenizer, TokenizerConfig};

use super::{SearchApp, TokenizerFactory};

/// Builder for configuring SearchApp initialization.
///
/// # Example
///
/// ```rust,ignore
/// use sora_fts::SearchApp;
///
/// let app = SearchApp::builder()
///     .corpus(vec!["東京の天気".to_string()])
///     .initial_query("天気")
///     .build()?;
/// app.start();
/// ```
#[derive(Default)]
pub struct SearchAppBuilder {
    config: AppConfig,
    tokenizer_factory: Option<TokenizerFactory>,
}

impl SearchAppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Documents to index instead of the built-in corpus.
    pub fn corpus(mut self, documents: Vec<String>) -> Self {
        self.config.corpus = Some(documents);
        self
    }

    /// Query searched as soon as both stages are ready.
    pub fn initial_query(mut self, query: impl Into<String>) -> Self {
        self.config.initial_query = query.into();
        self
    }

    pub fn tokenizer_config(mut self, config: TokenizerConfig) -> Self {
        self.config.tokenizer = config;
        self
    }

    pub fn store_config(mut self, config: StoreConfig) -> Self {
        self.config.store = config;
        self
    }

    /// Build the tokenizer with `factory` instead of lindera.
    ///
    /// The factory runs once, on the blocking pool.
    pub fn with_tokenizer_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&TokenizerConfig) -> Result<Arc<dyn TextTokenizer>> + Send + Sync + 'static,
    {
        self.tokenizer_factory = Some(Arc::new(factory));
        self
    }

    /// Validate the configuration and create the app.
    ///
    /// Nothing is initialized yet; call `SearchApp::start` or await
    /// `SearchApp::ensure_store`.
    pub fn build(self) -> Result<SearchApp> {
        self.config.validate()?;
        Ok(SearchApp::from_parts(self.config, self.tokenizer_factory))
    }
}
