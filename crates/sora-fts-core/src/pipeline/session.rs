//! Query session: the current query and the latest applied results.
//!
//! Every issued search gets a sequence number. An outcome is applied only if
//! its number is higher than the last applied one, so a slow, older search
//! can never overwrite a newer result.

use crate::error::SearchError;
use crate::index::ResultRow;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Handle for one issued search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Default)]
struct SessionInner {
    query: String,
    applied_seq: u64,
    results: Vec<ResultRow>,
    error: Option<String>,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Latest query typed by the user.
    pub query: String,
    /// Sequence number of the outcome currently shown.
    pub applied_seq: u64,
    pub results: Vec<ResultRow>,
    /// Error of the most recent applied search, if it failed.
    pub error: Option<String>,
}

pub struct QuerySession {
    next_seq: AtomicU64,
    inner: Mutex<SessionInner>,
}

impl QuerySession {
    pub fn new(initial_query: impl Into<String>) -> Self {
        Self {
            next_seq: AtomicU64::new(0),
            inner: Mutex::new(SessionInner {
                query: initial_query.into(),
                ..SessionInner::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    /// Record `query` as current and issue a ticket for searching it.
    pub fn begin(&self, query: &str) -> QueryTicket {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().query = query.to_string();
        debug!("Issued query #{}: {:?}", seq, query);
        QueryTicket {
            seq,
            query: query.to_string(),
        }
    }

    /// Apply a finished search. Returns false if the outcome was stale.
    ///
    /// A failed search keeps the previously shown rows and records the error.
    pub fn settle(
        &self,
        ticket: &QueryTicket,
        outcome: std::result::Result<Vec<ResultRow>, SearchError>,
    ) -> bool {
        let mut inner = self.lock();
        if ticket.seq <= inner.applied_seq {
            debug!(
                "Discarding stale result #{} (showing #{})",
                ticket.seq, inner.applied_seq
            );
            return false;
        }

        inner.applied_seq = ticket.seq;
        match outcome {
            Ok(rows) => {
                inner.results = rows;
                inner.error = None;
            }
            Err(e) => {
                warn!("Query #{} {:?} failed: {}", ticket.seq, ticket.query, e);
                inner.error = Some(e.to_string());
            }
        }
        true
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        SessionSnapshot {
            query: inner.query.clone(),
            applied_seq: inner.applied_seq,
            results: inner.results.clone(),
            error: inner.error.clone(),
        }
    }
}
