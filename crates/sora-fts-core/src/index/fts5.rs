//! FTS5 capability checks and index construction.

use super::StoreConfig;
use crate::error::{Result, SearchError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// FTS5 tokenizer options for pre-tokenized text.
///
/// Punctuation and symbols count as token characters, so only whitespace
/// separates terms and every token from the upstream tokenizer survives
/// as-is. No stemmer, no stopwords, diacritics kept.
///
/// `unicode61` always folds case and has no option to keep it. With the
/// default filter chain tokens arrive lowercased, so folding changes nothing.
/// A tokenizer that keeps case (a config without the `lowercase` filter, or a
/// custom `TokenizerFactory`) still gets case-insensitive matching.
pub const FTS5_TOKENIZE: &str = "unicode61 remove_diacritics 0 categories 'L* N* Co M* P* S*'";

/// Manager for FTS5 setup on a document table.
pub struct FTS5Manager<'a> {
    config: &'a StoreConfig,
}

impl<'a> FTS5Manager<'a> {
    pub fn new(config: &'a StoreConfig) -> Self {
        Self { config }
    }

    /// Check that the engine was compiled with FTS5.
    pub fn install(&self, conn: &Connection) -> Result<()> {
        let enabled: i64 = conn.query_row(
            "SELECT sqlite_compileoption_used('ENABLE_FTS5')",
            [],
            |row| row.get(0),
        )?;
        if enabled != 1 {
            return Err(SearchError::Database {
                message: "SQLite was built without FTS5".to_string(),
                source: None,
            });
        }
        debug!("FTS5 is compiled in");
        Ok(())
    }

    /// Probe that the fts5 module is registered on this connection.
    ///
    /// Must run after `install`.
    pub fn load(&self, conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE VIRTUAL TABLE temp.fts5_probe USING fts5(probe);
             DROP TABLE temp.fts5_probe;",
        )?;
        debug!("FTS5 module loaded");
        Ok(())
    }

    /// Install then load the FTS capability.
    pub fn enable(&self, conn: &Connection) -> Result<()> {
        self.install(conn)?;
        self.load(conn)?;
        info!("Full-text search enabled");
        Ok(())
    }

    /// Check if the FTS5 index table exists.
    pub fn index_exists(&self, conn: &Connection) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [&self.config.fts_table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Build the index over the tokenized-content column.
    ///
    /// The FTS table borrows its content from the document table and is
    /// filled in one pass with the `rebuild` command.
    pub fn create_index(&self, conn: &Connection) -> Result<()> {
        let fts = &self.config.fts_table_name;
        let sql = format!(
            "CREATE VIRTUAL TABLE {fts} USING fts5(
                content_tokens,
                content='{table}',
                content_rowid='id',
                tokenize=\"{tokenize}\"
            )",
            fts = fts,
            table = self.config.table_name,
            tokenize = FTS5_TOKENIZE,
        );
        conn.execute(&sql, [])?;
        conn.execute(&format!("INSERT INTO {fts}({fts}) VALUES('rebuild')", fts = fts), [])?;

        info!("Built FTS5 index {} over {}.content_tokens", fts, self.config.table_name);
        Ok(())
    }

    /// Get statistics about the index.
    pub fn get_stats(&self, conn: &Connection) -> Result<IndexStats> {
        let document_count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.config.table_name),
            [],
            |row| row.get(0),
        )?;

        Ok(IndexStats {
            table_name: self.config.table_name.clone(),
            fts_table_name: self.config.fts_table_name.clone(),
            document_count: document_count as usize,
            tokenizer_options: FTS5_TOKENIZE.to_string(),
        })
    }
}

/// Statistics about the document table and its index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub table_name: String,
    pub fts_table_name: String,
    pub document_count: usize,
    pub tokenizer_options: String,
}
