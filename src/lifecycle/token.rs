//! One-shot cancellation token.
//!
//! # States
//! ```text
//! Active ──cancel()──▶ Cancelled (terminal)
//! ```
//!
//! The first call to [`CancelToken::cancel_with`] records the reason and
//! releases every waiter; later calls change nothing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::watch;

use crate::error::AppError;
use crate::lifecycle::signals::SignalKind;

/// Why a token was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Explicit `App::stop` (or `CancelToken::cancel`).
    Stopped,
    /// An OS termination signal arrived.
    Signal(SignalKind),
    /// A task in the group returned an error.
    TaskFailed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Stopped => write!(f, "stopped"),
            CancelReason::Signal(kind) => write!(f, "received {}", kind),
            CancelReason::TaskFailed => write!(f, "task failed"),
        }
    }
}

struct Inner {
    cancelled: AtomicBool,
    reason: OnceLock<CancelReason>,
    tx: watch::Sender<bool>,
}

/// Shared cancellation signal.
///
/// Clones observe the same state.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// Create a new, active token.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                reason: OnceLock::new(),
                tx,
            }),
        }
    }

    /// Cancel with [`CancelReason::Stopped`].
    pub fn cancel(&self) -> bool {
        self.cancel_with(CancelReason::Stopped)
    }

    /// Cancel with an explicit reason.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn cancel_with(&self, reason: CancelReason) -> bool {
        if self.inner.reason.set(reason).is_err() {
            return false;
        }
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.tx.send_replace(true);
        true
    }

    /// Whether the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Wait until the token is cancelled. Resolves immediately if it already is.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let mut rx = self.inner.tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// The recorded reason, once cancelled.
    pub fn reason(&self) -> Option<CancelReason> {
        if !self.is_cancelled() {
            return None;
        }
        self.inner.reason.get().copied()
    }

    /// The cancellation as an error value, once cancelled.
    pub fn err(&self) -> Option<AppError> {
        self.reason().map(AppError::Canceled)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("reason", &self.reason())
            .finish()
    }
}
