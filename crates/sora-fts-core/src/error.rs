//! Error types for the search pipeline.
//!
//! Initialization failures are terminal for their stage, query failures are
//! recoverable per invocation. An empty token set is not an error at all and
//! never appears here: it degrades to an empty result list.

use crate::pipeline::{StageKind, StageState};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the search pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    // Stage errors
    #[error("Initialization of {stage} failed: {message}")]
    Initialization { stage: StageKind, message: String },

    #[error("Search is not ready (tokenizer: {tokenizer}, store: {store})")]
    NotReady {
        tokenizer: StageState,
        store: StageState,
    },

    // Query errors
    #[error("Query execution failed: {message}")]
    QueryExecution {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("Tokenizer error: {message}")]
    Tokenizer { message: String },

    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

impl From<std::io::Error> for SearchError {
    fn from(err: std::io::Error) -> Self {
        SearchError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(err: rusqlite::Error) -> Self {
        SearchError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<tokio::task::JoinError> for SearchError {
    fn from(err: tokio::task::JoinError) -> Self {
        SearchError::Other(format!("Background task failed: {}", err))
    }
}

impl SearchError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        SearchError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Wrap any error raised while a stage was being built.
    pub fn initialization(stage: StageKind, err: impl std::fmt::Display) -> Self {
        SearchError::Initialization {
            stage,
            message: err.to_string(),
        }
    }

    /// Reclassify a database error raised while answering a query.
    pub fn into_query_error(self) -> Self {
        match self {
            SearchError::Database { message, source } => {
                SearchError::QueryExecution { message, source }
            }
            other => other,
        }
    }

    /// HTTP status code the presentation layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::NotReady { .. } => 503,
            SearchError::Config { .. } | SearchError::Json { .. } => 400,
            _ => 500,
        }
    }

    /// Check if retrying the same call later can succeed.
    ///
    /// Only readiness is transient; a failed stage never recovers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::NotReady { .. })
    }
}
