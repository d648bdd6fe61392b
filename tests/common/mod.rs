//! Shared mock servers for integration testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lifecycle_app::{BoxError, CancelToken, Server};

/// What a mock's `start` does.
#[allow(dead_code)]
pub enum StartBehavior {
    /// Block until the token is cancelled, then succeed.
    UntilCancelled,
    /// Succeed right away without blocking.
    ReturnImmediately,
    /// Fail with the message after the delay.
    FailAfter(Duration, &'static str),
}

/// A server that records how the orchestrator drives it.
pub struct MockServer {
    name: &'static str,
    start: StartBehavior,
    stop_error: Option<&'static str>,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    stopped_before_cancel: AtomicBool,
}

#[allow(dead_code)]
impl MockServer {
    pub fn new(name: &'static str, start: StartBehavior) -> Self {
        Self {
            name,
            start,
            stop_error: None,
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            stopped_before_cancel: AtomicBool::new(false),
        }
    }

    /// Make `stop` fail with `msg`.
    pub fn failing_stop(mut self, msg: &'static str) -> Self {
        self.stop_error = Some(msg);
        self
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn stopped_before_cancel(&self) -> bool {
        self.stopped_before_cancel.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Server for MockServer {
    fn name(&self) -> &str {
        self.name
    }

    fn endpoint(&self) -> Result<String, BoxError> {
        Ok(format!("mock://{}", self.name))
    }

    async fn start(&self, token: CancelToken) -> Result<(), BoxError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        match self.start {
            StartBehavior::UntilCancelled => {
                token.cancelled().await;
                Ok(())
            }
            StartBehavior::ReturnImmediately => Ok(()),
            StartBehavior::FailAfter(delay, msg) => {
                tokio::time::sleep(delay).await;
                Err(msg.into())
            }
        }
    }

    async fn stop(&self, token: CancelToken) -> Result<(), BoxError> {
        if !token.is_cancelled() {
            self.stopped_before_cancel.store(true, Ordering::SeqCst);
        }
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        match self.stop_error {
            Some(msg) => Err(msg.into()),
            None => Ok(()),
        }
    }
}
