//! The contract every managed server implements.

use async_trait::async_trait;

use crate::error::BoxError;
use crate::lifecycle::token::CancelToken;

/// A long-lived component the [`App`](crate::lifecycle::App) starts and stops.
///
/// `start` and `stop` may run concurrently on the same instance.
#[async_trait]
pub trait Server: Send + Sync + 'static {
    /// Name used in logs and error context.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Address the server is reachable at. Descriptive only.
    fn endpoint(&self) -> Result<String, BoxError>;

    /// Run the server.
    ///
    /// Blocks until the server stops on its own, fails, or `token` is
    /// cancelled, and must return promptly after cancellation.
    async fn start(&self, token: CancelToken) -> Result<(), BoxError>;

    /// Shut the server down gracefully. Called once per run, after cancellation.
    async fn stop(&self, token: CancelToken) -> Result<(), BoxError>;
}
