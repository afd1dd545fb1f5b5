//! Initialization stages, the query pipeline, and the query session.

mod session;
mod stage;

pub use session::{QuerySession, QueryTicket, SessionSnapshot};
pub use stage::{Readiness, Stage, StageKind, StageState};

use crate::error::Result;
use crate::index::{DocumentStore, ResultRow};
use crate::tokenizer::TextTokenizer;
use std::sync::Arc;

/// Tokenize `query` and rank the store's documents against it.
///
/// Empty and whitespace-only queries return no rows without touching the
/// store.
pub async fn search(
    store: Arc<DocumentStore>,
    tokenizer: Arc<dyn TextTokenizer>,
    query: &str,
) -> Result<Vec<ResultRow>> {
    if query.trim().is_empty() {
        return Ok(Vec::new());
    }
    let query = query.to_string();
    tokio::task::spawn_blocking(move || store.search(tokenizer.as_ref(), &query)).await?
}
