//! One-shot initialization stages.
//!
//! Each stage moves `Uninitialized -> Initializing -> Ready | Failed`.
//! The initializer runs at most once: concurrent callers await the same
//! in-flight attempt and a failure is cached for good.

use crate::error::{Result, SearchError};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Which pipeline stage a state or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Tokenizer,
    Store,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Tokenizer => write!(f, "tokenizer"),
            StageKind::Store => write!(f, "store"),
        }
    }
}

/// Lifecycle of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum StageState {
    Uninitialized,
    Initializing,
    Ready,
    Failed(String),
}

impl std::fmt::Display for StageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageState::Uninitialized => write!(f, "uninitialized"),
            StageState::Initializing => write!(f, "initializing"),
            StageState::Ready => write!(f, "ready"),
            StageState::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

impl StageState {
    pub fn is_ready(&self) -> bool {
        matches!(self, StageState::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageState::Failed(_))
    }

    /// Human-readable status for the readiness indicator.
    pub fn label(&self) -> String {
        match self {
            StageState::Ready => "OK".to_string(),
            StageState::Failed(message) => format!("Failed: {}", message),
            StageState::Uninitialized | StageState::Initializing => "Loading...".to_string(),
        }
    }
}

/// Combined readiness of both stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub tokenizer: StageState,
    pub store: StageState,
    pub ready: bool,
}

impl Readiness {
    pub fn new(tokenizer: StageState, store: StageState) -> Self {
        let ready = tokenizer.is_ready() && store.is_ready();
        Self {
            tokenizer,
            store,
            ready,
        }
    }

    /// The single precondition checked before any query runs.
    pub fn check(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(SearchError::NotReady {
                tokenizer: self.tokenizer.clone(),
                store: self.store.clone(),
            })
        }
    }
}

/// A value built once, asynchronously.
pub struct Stage<T: ?Sized> {
    kind: StageKind,
    started: AtomicBool,
    cell: OnceCell<std::result::Result<Arc<T>, String>>,
}

impl<T: ?Sized> Stage<T> {
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            started: AtomicBool::new(false),
            cell: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn state(&self) -> StageState {
        match self.cell.get() {
            Some(Ok(_)) => StageState::Ready,
            Some(Err(message)) => StageState::Failed(message.clone()),
            None if self.started.load(Ordering::SeqCst) => StageState::Initializing,
            None => StageState::Uninitialized,
        }
    }

    /// The value, if the stage is ready.
    pub fn get(&self) -> Option<Arc<T>> {
        match self.cell.get() {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Run `init` unless another caller already did, and return its outcome.
    pub async fn get_or_init<F, Fut>(&self, init: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<T>>>,
    {
        let outcome = self
            .cell
            .get_or_init(|| async {
                self.started.store(true, Ordering::SeqCst);
                info!("Initializing {}", self.kind);
                let start = Instant::now();

                match init().await {
                    Ok(value) => {
                        info!(
                            "{} ready in {:.2}s",
                            self.kind,
                            start.elapsed().as_secs_f64()
                        );
                        Ok(value)
                    }
                    Err(SearchError::Initialization { message, .. }) => {
                        error!("{} initialization failed: {}", self.kind, message);
                        Err(message)
                    }
                    Err(other) => {
                        error!("{} initialization failed: {}", self.kind, other);
                        Err(other.to_string())
                    }
                }
            })
            .await;

        match outcome {
            Ok(value) => Ok(value.clone()),
            Err(message) => Err(SearchError::Initialization {
                stage: self.kind,
                message: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_state_transitions() {
        let stage: Arc<Stage<u32>> = Arc::new(Stage::new(StageKind::Tokenizer));
        assert_eq!(stage.state(), StageState::Uninitialized);
        assert!(stage.get().is_none());

        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let background = stage.clone();
        let handle = tokio::spawn(async move {
            background
                .get_or_init(|| async move {
                    release_rx.await.ok();
                    Ok(Arc::new(7))
                })
                .await
        });

        while stage.state() == StageState::Uninitialized {
            tokio::task::yield_now().await;
        }
        assert_eq!(stage.state(), StageState::Initializing);

        release_tx.send(()).unwrap();
        assert_eq!(*handle.await.unwrap().unwrap(), 7);
        assert_eq!(stage.state(), StageState::Ready);
        assert_eq!(stage.get().map(|v| *v), Some(7));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_initializer_runs_once_for_concurrent_callers() {
        let stage: Arc<Stage<String>> = Arc::new(Stage::new(StageKind::Store));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let stage = stage.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    stage
                        .get_or_init(|| async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(Arc::new("store".to_string()))
                        })
                        .await
                })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            assert_eq!(result.unwrap().unwrap().as_str(), "store");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_terminal() {
        let stage: Stage<u32> = Stage::new(StageKind::Tokenizer);

        let err = stage
            .get_or_init(|| async {
                Err(SearchError::Config {
                    message: "rejected filter".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Initialization {
                stage: StageKind::Tokenizer,
                ..
            }
        ));
        assert!(stage.state().is_failed());

        // A second attempt is not made.
        let again = stage.get_or_init(|| async { Ok(Arc::new(1)) }).await;
        assert!(again.is_err());
        assert!(stage.get().is_none());
    }

    #[tokio::test]
    async fn test_initialization_message_not_nested() {
        let stage: Stage<u32> = Stage::new(StageKind::Store);
        let err = stage
            .get_or_init(|| async {
                Err(SearchError::initialization(StageKind::Store, "index build failed"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Initialization of store failed: index build failed");
        assert_eq!(
            stage.state(),
            StageState::Failed("index build failed".to_string())
        );
    }

    #[test]
    fn test_readiness() {
        let readiness = Readiness::new(StageState::Ready, StageState::Initializing);
        assert!(!readiness.ready);
        assert!(matches!(readiness.check(), Err(SearchError::NotReady { .. })));

        let readiness = Readiness::new(StageState::Ready, StageState::Ready);
        assert!(readiness.check().is_ok());
    }

    #[test]
    fn test_labels() {
        assert_eq!(StageState::Ready.label(), "OK");
        assert_eq!(StageState::Initializing.label(), "Loading...");
        assert_eq!(StageState::Uninitialized.label(), "Loading...");
        assert_eq!(StageState::Failed("x".into()).label(), "Failed: x");
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(StageState::Failed("boom".into())).unwrap();
        assert_eq!(json, serde_json::json!({"state": "failed", "message": "boom"}));

        let json = serde_json::to_value(StageState::Ready).unwrap();
        assert_eq!(json, serde_json::json!({"state": "ready"}));
    }
}
