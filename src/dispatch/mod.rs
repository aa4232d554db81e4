//! # Thread dispatch shim.
//!
//! Runs an async unit of work on an appropriate execution context.
//!
//! ```text
//! run(task)
//!   ├─ dispatcher unconstrained ─► task().await
//!   └─ constrained ─► dispatch(job) ──► job sends task() result over oneshot
//!                        │                     │
//!                        ├─ Rejected ──────────┼─► fallback: task().await
//!                        └─ job dropped ───────┘
//! ```
//!
//! ## Rules
//! - Only failures of the dispatch primitive trigger the fallback; a task's
//!   own result (success or failure) is returned unchanged.
//! - The task is a factory, so the fallback always gets a fresh future.
//! - If a dispatched job panics, its result channel closes and the task runs
//!   again directly.

use std::future::Future;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::error::DispatchError;

/// Unit of work handed to a dispatcher.
pub type Job = BoxFuture<'static, ()>;

/// Decides whether the caller is constrained and moves jobs elsewhere.
pub trait Dispatcher: Send + Sync + 'static {
    /// Whether the current caller must not run native calls directly.
    fn is_constrained(&self) -> bool;

    /// Hands `job` to a background context.
    fn dispatch(&self, job: Job) -> Result<(), DispatchError>;
}

/// Never constrained; everything runs on the caller's context.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Dispatcher for Inline {
    fn is_constrained(&self) -> bool {
        false
    }

    fn dispatch(&self, _job: Job) -> Result<(), DispatchError> {
        Err(DispatchError::Rejected {
            reason: "inline dispatcher has no background context".into(),
        })
    }
}

/// Feeds jobs through a bounded queue into a tokio runtime.
///
/// Constrained when called from the thread that created it (typically the
/// host's UI thread), unless overridden with
/// [`with_constrained_thread`](Self::with_constrained_thread).
#[derive(Debug, Clone)]
pub struct BackgroundDispatcher {
    tx: mpsc::Sender<Job>,
    constrained: ThreadId,
}

impl BackgroundDispatcher {
    /// Starts the queue worker on `handle`.
    pub fn spawn(handle: &Handle, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(capacity.max(1));
        let runtime = handle.clone();
        handle.spawn(async move {
            while let Some(job) = rx.recv().await {
                runtime.spawn(job);
            }
        });

        Self {
            tx,
            constrained: thread::current().id(),
        }
    }

    /// Marks a different thread as the constrained one.
    pub fn with_constrained_thread(mut self, id: ThreadId) -> Self {
        self.constrained = id;
        self
    }
}

impl Dispatcher for BackgroundDispatcher {
    fn is_constrained(&self) -> bool {
        thread::current().id() == self.constrained
    }

    fn dispatch(&self, job: Job) -> Result<(), DispatchError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DispatchError::Rejected {
                reason: "queue full".into(),
            },
            mpsc::error::TrySendError::Closed(_) => DispatchError::Rejected {
                reason: "worker stopped".into(),
            },
        })
    }
}

/// Wraps a [`Dispatcher`] with the direct-execution fallback.
#[derive(Clone)]
pub struct DispatchShim {
    dispatcher: Arc<dyn Dispatcher>,
}

impl DispatchShim {
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Runs a fresh instance of `task` on the appropriate context.
    pub async fn run<T, F, Fut>(&self, task: F) -> T
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        if !self.dispatcher.is_constrained() {
            return task().await;
        }

        let task = Arc::new(task);
        let (tx, rx) = oneshot::channel();
        let job_task = Arc::clone(&task);
        let job: Job = Box::pin(async move {
            let _ = tx.send((*job_task)().await);
        });

        let outcome = match self.dispatcher.dispatch(job) {
            Ok(()) => rx.await.map_err(|_| DispatchError::Dropped),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(reason = e.as_label(), error = %e, "background dispatch failed, running task directly");
                (*task)().await
            }
        }
    }
}

impl Default for DispatchShim {
    fn default() -> Self {
        Self::new(Arc::new(Inline))
    }
}
