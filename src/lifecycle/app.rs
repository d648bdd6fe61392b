//! The application orchestrator.
//!
//! # Run protocol
//! ```text
//! run():
//!     install signal listeners
//!     for each server (registration order):
//!         spawn stop-waiter:  token.cancelled() → server.stop()
//!         spawn start-runner: server.start()
//!     spawn signal listener:  token.cancelled() | signal → cancel
//!     wait for all tasks → first error
//! ```
//!
//! Cancellation comes from `App::stop`, a received signal, or the first
//! failing task. Every path flips the same token.

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::error::{AppError, BoxError};
use crate::lifecycle::group::TaskGroup;
use crate::lifecycle::server::Server;
use crate::lifecycle::signals::{self, SignalKind, SignalSet, DEFAULT_SIGNALS};
use crate::lifecycle::token::CancelToken;

const DEFAULT_NAME: &str = "app";

/// Construction-time options for an [`App`].
pub struct AppBuilder {
    name: String,
    signals: Vec<SignalKind>,
    servers: Vec<Arc<dyn Server>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            signals: DEFAULT_SIGNALS.to_vec(),
            servers: Vec::new(),
        }
    }

    /// Name shown in logs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the default signal set.
    pub fn signals(mut self, signals: impl IntoIterator<Item = SignalKind>) -> Self {
        self.signals = signals.into_iter().collect();
        self
    }

    /// Register a server.
    pub fn server(mut self, server: Arc<dyn Server>) -> Self {
        self.servers.push(server);
        self
    }

    pub fn build(self) -> App {
        App {
            name: self.name,
            token: CancelToken::new(),
            servers: self.servers,
            signals: self.signals,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a fixed set of servers until one fails, a signal arrives, or
/// [`App::stop`] is called.
///
/// An `App` runs once: after its token is cancelled a further `run`
/// shuts down immediately.
pub struct App {
    name: String,
    token: CancelToken,
    servers: Vec<Arc<dyn Server>>,
    signals: Vec<SignalKind>,
}

impl App {
    /// An app with default options and no servers.
    pub fn new() -> Self {
        AppBuilder::new().build()
    }

    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signals this app listens for while running.
    pub fn signals(&self) -> &[SignalKind] {
        &self.signals
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// Register a server. Servers are started in registration order.
    pub fn append_server(&mut self, server: Arc<dyn Server>) {
        self.servers.push(server);
    }

    /// Register an owned server.
    pub fn append_server_boxed(&mut self, server: Box<dyn Server>) {
        self.servers.push(Arc::from(server));
    }

    /// The app's cancellation token.
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Request shutdown. Safe to call any number of times, from anywhere.
    pub fn stop(&self) {
        if self.token.cancel() {
            tracing::info!(app = %self.name, "Stop requested");
        }
    }

    /// Endpoint reported by each server, keyed by server name.
    pub fn endpoints(&self) -> Vec<(String, Result<String, BoxError>)> {
        self.servers
            .iter()
            .map(|srv| (srv.name().to_string(), srv.endpoint()))
            .collect()
    }

    /// Run every server until shutdown and return the first error.
    pub async fn run(&self) -> Result<(), AppError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("app_run", app = %self.name, %run_id);
        self.run_servers().instrument(span).await
    }

    async fn run_servers(&self) -> Result<(), AppError> {
        let signal_set = SignalSet::install(&self.signals)?;
        let mut group = TaskGroup::new(self.token.clone());

        for server in &self.servers {
            let name = server.name().to_string();

            let srv = Arc::clone(server);
            let token = self.token.clone();
            let server_name = name.clone();
            group.spawn(
                async move {
                    token.cancelled().await;
                    tracing::debug!(server = %server_name, "Stopping server");
                    srv.stop(token)
                        .await
                        .map_err(|source| AppError::Stop { server: server_name, source })
                }
                .in_current_span(),
            );

            let srv = Arc::clone(server);
            let token = self.token.clone();
            group.spawn(
                async move {
                    tracing::debug!(server = %name, "Starting server");
                    match srv.start(token).await {
                        Ok(()) => {
                            tracing::debug!(server = %name, "Server exited");
                            Ok(())
                        }
                        Err(source) => Err(AppError::Start { server: name, source }),
                    }
                }
                .in_current_span(),
            );
        }

        group.spawn(signals::listen(self.token.clone(), signal_set).in_current_span());

        tracing::info!(
            servers = self.servers.len(),
            tasks = group.len(),
            signals = ?self.signals,
            "App running"
        );

        let result = group.wait().await;
        match &result {
            Ok(()) => tracing::info!("App stopped"),
            Err(e) if e.is_canceled() => tracing::info!(reason = %e, "App stopped"),
            Err(e) => tracing::error!(error = %e, "App stopped with error"),
        }
        result
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named(&'static str);

    #[async_trait]
    impl Server for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn endpoint(&self) -> Result<String, BoxError> {
            if self.0 == "broken" {
                return Err("no address".into());
            }
            Ok(format!("tcp://{}", self.0))
        }

        async fn start(&self, token: CancelToken) -> Result<(), BoxError> {
            token.cancelled().await;
            Ok(())
        }

        async fn stop(&self, _token: CancelToken) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults() {
        let app = App::new();
        assert_eq!(app.name(), "app");
        assert_eq!(app.signals(), &DEFAULT_SIGNALS);
        assert_eq!(app.server_count(), 0);
        assert!(!app.token().is_cancelled());
    }

    #[test]
    fn test_builder_overrides_signals() {
        let app = App::builder()
            .name("edge")
            .signals([SignalKind::Hangup])
            .server(Arc::new(Named("a")))
            .build();
        assert_eq!(app.name(), "edge");
        assert_eq!(app.signals(), &[SignalKind::Hangup]);
        assert_eq!(app.server_count(), 1);
    }

    #[test]
    fn test_stop_before_run_is_idempotent() {
        let app = App::new();
        app.stop();
        app.stop();
        assert!(app.token().is_cancelled());
    }

    #[test]
    fn test_endpoints_in_registration_order() {
        let mut app = App::new();
        app.append_server(Arc::new(Named("a")));
        app.append_server(Arc::new(Named("broken")));

        let endpoints = app.endpoints();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].0, "a");
        assert_eq!(endpoints[0].1.as_deref().unwrap(), "tcp://a");
        assert!(endpoints[1].1.is_err());
    }

    #[test]
    fn test_boxed_servers_keep_registration_order() {
        let mut app = App::new();
        app.append_server_boxed(Box::new(Named("first")));
        app.append_server(Arc::new(Named("second")));
        app.append_server_boxed(Box::new(Named("third")));

        let names: Vec<_> = app.endpoints().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(app.server_count(), 3);
    }

    #[tokio::test]
    async fn test_run_after_stop_returns_canceled() {
        let app = App::builder()
            .signals([])
            .server(Arc::new(Named("a")))
            .build();
        app.stop();

        let err = app.run().await.unwrap_err();
        assert!(err.is_canceled());
    }
}
