//! Error types shared by the orchestrator and its servers.

use thiserror::Error;

use crate::lifecycle::signals::SignalKind;
use crate::lifecycle::token::CancelReason;

/// Error returned by [`Server`](crate::lifecycle::Server) implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can end an [`App::run`](crate::lifecycle::App::run).
///
/// Only one of these is ever reported per run: whichever task failed first.
#[derive(Debug, Error)]
pub enum AppError {
    /// The run ended through cancellation alone.
    #[error("context canceled ({0})")]
    Canceled(CancelReason),

    /// A server's `start` returned an error.
    #[error("server {server} failed to start: {source}")]
    Start {
        server: String,
        #[source]
        source: BoxError,
    },

    /// A server's `stop` returned an error.
    #[error("server {server} failed to stop: {source}")]
    Stop {
        server: String,
        #[source]
        source: BoxError,
    },

    /// Registering an OS signal listener failed.
    #[error("failed to listen for {signal}: {source}")]
    SignalInstall {
        signal: SignalKind,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// True when the run ended through cancellation rather than a failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, AppError::Canceled(_))
    }
}
