//! SQLite document store with FTS5 full-text search.
//!
//! This module provides:
//! - Document storage in an in-memory SQLite database
//! - FTS5 enablement and index construction over pre-tokenized text
//! - Match-expression building and BM25-ranked search

mod fts5;
mod query;
mod store;

pub use fts5::{FTS5Manager, IndexStats, FTS5_TOKENIZE};
pub use query::{build_match_expression, escape_fts5_term};
pub use store::{initialize_store, Document, DocumentStore, ResultRow, StoreConfig};
