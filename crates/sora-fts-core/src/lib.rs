//! Sora FTS - Japanese full-text search over a small fixed corpus.
//!
//! A lindera tokenizer (IPADIC, NFKC, lowercase, numeral compounds) splits
//! documents and queries into terms; an in-memory SQLite database indexes
//! the space-joined terms with FTS5 and ranks documents with BM25.
//!
//! Initialization runs in two one-shot stages, tokenizer first, then the
//! store. Queries are rejected until both are ready.
//!
//! # Example
//!
//! ```rust,ignore
//! use sora_fts::SearchApp;
//!
//! #[tokio::main]
//! async fn main() -> sora_fts::Result<()> {
//!     let app = SearchApp::builder().build()?;
//!     app.ensure_store().await?;
//!
//!     for row in app.search("センシティブ").await? {
//!         println!("{} {:.4} {}", row.id, row.score, row.content);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod tokenizer;

mod app;

pub use app::{SearchApp, SearchAppBuilder, SearchView, TokenizerFactory};
pub use config::AppConfig;
pub use error::{Result, SearchError};
pub use index::{Document, DocumentStore, IndexStats, ResultRow, StoreConfig};
pub use pipeline::{Readiness, SessionSnapshot, StageKind, StageState};
pub use tokenizer::{LinderaTokenizer, TextTokenizer, Token, TokenizerConfig, WhitespaceTokenizer};
