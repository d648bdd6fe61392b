//! Task group with cancel-on-first-error.
//!
//! # Design Decisions
//! - Errors are recorded inside each task at completion, so "first" means
//!   first to finish, not first to be joined
//! - The slot holds a single error; the writer that fills it cancels the token
//!   before releasing the lock
//! - Panics are not contained: a panicking task re-panics out of `wait()`

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinSet;

use crate::error::AppError;
use crate::lifecycle::token::{CancelReason, CancelToken};

/// Runs tasks concurrently and reports the first error.
pub struct TaskGroup {
    token: CancelToken,
    tasks: JoinSet<()>,
    first_error: Arc<Mutex<Option<AppError>>>,
}

impl TaskGroup {
    /// Create a group bound to `token`.
    pub fn new(token: CancelToken) -> Self {
        Self {
            token,
            tasks: JoinSet::new(),
            first_error: Arc::new(Mutex::new(None)),
        }
    }

    /// The token this group cancels on failure.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Number of tasks not yet joined.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawn `task` onto the runtime.
    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        let slot = Arc::clone(&self.first_error);
        let token = self.token.clone();

        self.tasks.spawn(async move {
            if let Err(err) = task.await {
                record_error(&slot, &token, err);
            }
        });
    }

    /// Wait for every task and return the first error, if any.
    pub async fn wait(mut self) -> Result<(), AppError> {
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(join_err) = joined {
                if join_err.is_panic() {
                    std::panic::resume_unwind(join_err.into_panic());
                }
            }
        }

        let first = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn record_error(slot: &Mutex<Option<AppError>>, token: &CancelToken, err: AppError) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        tracing::debug!(error = %err, "Discarding error, one is already recorded");
        return;
    }

    tracing::warn!(error = %err, "Task failed, cancelling group");
    *slot = Some(err);
    token.cancel_with(CancelReason::TaskFailed);
}
