//! In-memory SQLite document store with an FTS5 index.

use crate::error::{Result, SearchError};
use crate::pipeline::StageKind;
use crate::tokenizer::TextTokenizer;
use regex::Regex;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info};

use super::fts5::{FTS5Manager, IndexStats};
use super::query::build_match_expression;

static SQL_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Table naming for the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Name of the document table.
    pub table_name: String,
    /// Name of the FTS5 index table.
    pub fts_table_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_name: "sora_doc".to_string(),
            fts_table_name: "sora_doc_fts".to_string(),
        }
    }
}

impl StoreConfig {
    /// Table names are spliced into SQL, so they must be plain identifiers.
    pub fn validate(&self) -> Result<()> {
        for name in [&self.table_name, &self.fts_table_name] {
            if !SQL_IDENTIFIER.is_match(name) {
                return Err(SearchError::Config {
                    message: format!("invalid table name: {:?}", name),
                });
            }
        }
        if self.table_name == self.fts_table_name {
            return Err(SearchError::Config {
                message: "table_name and fts_table_name must differ".to_string(),
            });
        }
        Ok(())
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub content: String,
    pub content_tokens: String,
}

/// A ranked search hit. Higher scores are more relevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub id: i64,
    pub score: f64,
    pub content: String,
}

/// Document table plus FTS index over its tokenized column.
pub struct DocumentStore {
    conn: Mutex<Connection>,
    config: StoreConfig,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DocumentStore {
    /// Open the engine, load `documents` and build the index.
    ///
    /// Steps run strictly in order. Any failure aborts and is reported as an
    /// initialization error of the store stage.
    pub fn initialize(
        tokenizer: &dyn TextTokenizer,
        documents: &[String],
        config: StoreConfig,
    ) -> Result<Self> {
        Self::build(tokenizer, documents, config).map_err(|e| match e {
            SearchError::Initialization { .. } => e,
            other => SearchError::initialization(StageKind::Store, other),
        })
    }

    fn build(
        tokenizer: &dyn TextTokenizer,
        documents: &[String],
        config: StoreConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut conn = Connection::open_in_memory()?;
        info!("Opened in-memory database");

        let fts5 = FTS5Manager::new(&config);
        fts5.enable(&conn)?;

        Self::ensure_schema(&conn, &config)?;
        Self::load_documents(&mut conn, &config, tokenizer, documents)?;
        fts5.create_index(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            config,
        })
    }

    /// Create the document table. `AUTOINCREMENT` makes ids start at 1 and
    /// follow insertion order.
    fn ensure_schema(conn: &Connection, config: &StoreConfig) -> Result<()> {
        conn.execute(
            &format!(
                "CREATE TABLE {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    content TEXT NOT NULL,
                    content_tokens TEXT NOT NULL
                )",
                config.table_name
            ),
            [],
        )?;
        debug!("Created table {}", config.table_name);
        Ok(())
    }

    fn load_documents(
        conn: &mut Connection,
        config: &StoreConfig,
        tokenizer: &dyn TextTokenizer,
        documents: &[String],
    ) -> Result<()> {
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (content, content_tokens) VALUES (?1, ?2)",
                config.table_name
            ))?;
            for doc in documents {
                let tokens = tokenizer.tokenize_joined(doc)?;
                stmt.execute(params![doc, tokens])?;
                debug!("Inserted document {} ({} bytes)", tx.last_insert_rowid(), doc.len());
            }
        }
        tx.commit()?;

        info!("Loaded {} documents into {}", documents.len(), config.table_name);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SearchError::Database {
            message: "Failed to acquire connection lock".to_string(),
            source: None,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.config.table_name),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// All documents in id order.
    pub fn documents(&self) -> Result<Vec<Document>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, content, content_tokens FROM {} ORDER BY id",
            self.config.table_name
        ))?;
        let docs = stmt
            .query_map([], Self::row_to_document)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(docs)
    }

    /// Index statistics.
    pub fn index_stats(&self) -> Result<IndexStats> {
        let conn = self.lock()?;
        FTS5Manager::new(&self.config).get_stats(&conn)
    }

    /// Tokenize `query` and rank documents against it.
    ///
    /// An empty query or a query without tokens yields no rows.
    pub fn search(&self, tokenizer: &dyn TextTokenizer, query: &str) -> Result<Vec<ResultRow>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let tokens = tokenizer.tokenize_joined(query)?;
        self.search_tokens(&tokens)
    }

    /// Rank documents against already tokenized, space-joined text.
    pub fn search_tokens(&self, joined_tokens: &str) -> Result<Vec<ResultRow>> {
        let expression = build_match_expression(joined_tokens);
        if expression.is_empty() {
            debug!("Query produced no tokens");
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {t}.id, -bm25({f}) AS score, {t}.content
             FROM {f} JOIN {t} ON {t}.id = {f}.rowid
             WHERE {f} MATCH ?1
             ORDER BY score DESC, {t}.id ASC",
            t = self.config.table_name,
            f = self.config.fts_table_name,
        );

        let rows = conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| {
                let rows = stmt
                    .query_map(params![expression], Self::row_to_result)?
                    .collect::<std::result::Result<Vec<_>, _>>();
                rows
            })
            .map_err(|e| SearchError::from(e).into_query_error())?;

        debug!(
            "Query {:?} matched {} rows in {:.2}ms",
            expression,
            rows.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(rows)
    }

    fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
        Ok(Document {
            id: row.get(0)?,
            content: row.get(1)?,
            content_tokens: row.get(2)?,
        })
    }

    fn row_to_result(row: &Row<'_>) -> rusqlite::Result<ResultRow> {
        Ok(ResultRow {
            id: row.get(0)?,
            score: row.get(1)?,
            content: row.get(2)?,
        })
    }
}

/// Build a store on the blocking pool.
pub async fn initialize_store(
    tokenizer: Arc<dyn TextTokenizer>,
    documents: Vec<String>,
    config: StoreConfig,
) -> Result<DocumentStore> {
    tokio::task::spawn_blocking(move || {
        DocumentStore::initialize(tokenizer.as_ref(), &documents, config)
    })
    .await?
}
