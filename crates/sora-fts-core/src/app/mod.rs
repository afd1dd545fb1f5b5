//! The search application: two initialization stages and a query session.

mod builder;

pub use builder::SearchAppBuilder;

use crate::config::AppConfig;
use crate::error::{Result, SearchError};
use crate::index::{initialize_store, Document, DocumentStore, IndexStats, ResultRow};
use crate::pipeline::{self, QuerySession, Readiness, SessionSnapshot, Stage, StageKind};
use crate::tokenizer::{self, TextTokenizer, TokenizerConfig};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Custom tokenizer constructor, mainly for tests and non-Japanese corpora.
pub type TokenizerFactory =
    Arc<dyn Fn(&TokenizerConfig) -> Result<Arc<dyn TextTokenizer>> + Send + Sync>;

/// Session state plus readiness, as returned to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    /// Sequence number issued for this call, if it issued a search.
    pub seq: Option<u64>,
    /// Whether this call's outcome is the one now shown.
    pub applied: bool,
    #[serde(flatten)]
    pub session: SessionSnapshot,
    pub readiness: Readiness,
}

struct AppInner {
    config: AppConfig,
    tokenizer_factory: Option<TokenizerFactory>,
    tokenizer: Stage<dyn TextTokenizer>,
    store: Stage<DocumentStore>,
    session: QuerySession,
}

/// Main entry point: tokenizer stage, store stage, and query session.
///
/// Cheap to clone; clones share the same stages and session.
#[derive(Clone)]
pub struct SearchApp {
    inner: Arc<AppInner>,
}

impl SearchApp {
    pub fn builder() -> SearchAppBuilder {
        SearchAppBuilder::new()
    }

    /// Create an app with the given configuration and the lindera tokenizer.
    pub fn new(config: AppConfig) -> Result<Self> {
        SearchAppBuilder::new().with_config(config).build()
    }

    fn from_parts(config: AppConfig, tokenizer_factory: Option<TokenizerFactory>) -> Self {
        let session = QuerySession::new(config.initial_query.clone());
        Self {
            inner: Arc::new(AppInner {
                config,
                tokenizer_factory,
                tokenizer: Stage::new(StageKind::Tokenizer),
                store: Stage::new(StageKind::Store),
                session,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Build the tokenizer, or wait for the build already in flight.
    pub async fn ensure_tokenizer(&self) -> Result<Arc<dyn TextTokenizer>> {
        let factory = self.inner.tokenizer_factory.clone();
        let config = self.inner.config.tokenizer.clone();

        self.inner
            .tokenizer
            .get_or_init(|| async move {
                match factory {
                    Some(factory) => {
                        tokio::task::spawn_blocking(move || factory(&config)).await?
                    }
                    None => tokenizer::initialize(config).await,
                }
            })
            .await
    }

    /// Build the store once the tokenizer is ready.
    ///
    /// If the tokenizer stage failed, the store stage is never attempted.
    pub async fn ensure_store(&self) -> Result<Arc<DocumentStore>> {
        let tokenizer = self.ensure_tokenizer().await?;
        let documents = self.inner.config.documents();
        let store_config = self.inner.config.store.clone();

        self.inner
            .store
            .get_or_init(|| async move {
                let store = initialize_store(tokenizer, documents, store_config).await?;
                Ok(Arc::new(store))
            })
            .await
    }

    /// Drive both stages in the background, then search the current query.
    pub fn start(&self) -> JoinHandle<()> {
        let app = self.clone();
        tokio::spawn(async move {
            if let Err(e) = app.ensure_store().await {
                error!("Search pipeline failed to start: {}", e);
                return;
            }
            info!("Search pipeline ready");
            app.refresh().await;
        })
    }

    pub fn readiness(&self) -> Readiness {
        Readiness::new(self.inner.tokenizer.state(), self.inner.store.state())
    }

    fn ready_handles(&self) -> Result<(Arc<dyn TextTokenizer>, Arc<DocumentStore>)> {
        match (self.inner.tokenizer.get(), self.inner.store.get()) {
            (Some(tokenizer), Some(store)) => Ok((tokenizer, store)),
            _ => {
                self.readiness().check()?;
                Err(SearchError::Other("search stages not available".to_string()))
            }
        }
    }

    /// Run one ranked search. Fails with `NotReady` before both stages are up.
    pub async fn search(&self, query: &str) -> Result<Vec<ResultRow>> {
        let (tokenizer, store) = self.ready_handles()?;
        pipeline::search(store, tokenizer, query).await
    }

    /// Make `query` the current query and search it if possible.
    ///
    /// Before readiness the query is only recorded; `start` searches it once
    /// both stages are up.
    pub async fn submit_query(&self, query: &str) -> SearchView {
        let ticket = self.inner.session.begin(query);

        let applied = if self.readiness().ready {
            let outcome = self.search(query).await;
            self.inner.session.settle(&ticket, outcome)
        } else {
            debug!("Deferring query #{} until search is ready", ticket.seq);
            false
        };

        SearchView {
            seq: Some(ticket.seq),
            applied,
            session: self.inner.session.snapshot(),
            readiness: self.readiness(),
        }
    }

    /// Search the current query again.
    pub async fn refresh(&self) -> SearchView {
        let query = self.inner.session.query();
        self.submit_query(&query).await
    }

    /// Current session state without issuing a search.
    pub fn view(&self) -> SearchView {
        SearchView {
            seq: None,
            applied: false,
            session: self.inner.session.snapshot(),
            readiness: self.readiness(),
        }
    }

    /// Loaded documents, once the store is ready.
    pub async fn documents(&self) -> Result<Vec<Document>> {
        let (_, store) = self.ready_handles()?;
        tokio::task::spawn_blocking(move || store.documents()).await?
    }

    /// Index statistics, once the store is ready.
    pub async fn index_stats(&self) -> Result<IndexStats> {
        let (_, store) = self.ready_handles()?;
        tokio::task::spawn_blocking(move || store.index_stats()).await?
    }
}
