//! HTTP server managed by the app.
//!
//! # Responsibilities
//! - Bind the listener when started
//! - Serve `/healthz` and a small JSON index
//! - Drain in-flight requests once the run is cancelled
//!
//! # Design Decisions
//! - Graceful shutdown is driven by the token inside `start`; `stop` only
//!   waits for the serve loop to finish draining
//! - Binding happens in `start`, so a taken port surfaces as a start failure

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use crate::config::HttpServerConfig;
use crate::error::BoxError;
use crate::lifecycle::{CancelToken, Server};

/// Axum-based HTTP server.
pub struct HttpServer {
    name: String,
    bind_address: String,
    local_addr: Mutex<Option<SocketAddr>>,
    finished: watch::Sender<bool>,
}

impl HttpServer {
    pub fn new(name: impl Into<String>, bind_address: impl Into<String>) -> Self {
        let (finished, _) = watch::channel(false);
        Self {
            name: name.into(),
            bind_address: bind_address.into(),
            local_addr: Mutex::new(None),
            finished,
        }
    }

    pub fn from_config(config: &HttpServerConfig) -> Self {
        Self::new(config.name.clone(), config.bind_address.clone())
    }

    /// Address actually bound, once the server is listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn router(&self) -> Router {
        let name: Arc<str> = Arc::from(self.name.as_str());
        Router::new()
            .route("/healthz", get(|| async { "ok" }))
            .route("/", get(index))
            .with_state(name)
            .layer(TraceLayer::new_for_http())
    }
}

async fn index(State(name): State<Arc<str>>) -> Json<Value> {
    Json(json!({ "name": &*name }))
}

/// Marks the serve loop finished however `start` exits.
struct Finished<'a>(&'a watch::Sender<bool>);

impl Drop for Finished<'_> {
    fn drop(&mut self) {
        self.0.send_replace(true);
    }
}

#[async_trait]
impl Server for HttpServer {
    fn name(&self) -> &str {
        &self.name
    }

    fn endpoint(&self) -> Result<String, BoxError> {
        if let Some(addr) = self.local_addr() {
            return Ok(format!("http://{}", addr));
        }
        let addr: SocketAddr = self.bind_address.parse()?;
        Ok(format!("http://{}", addr))
    }

    async fn start(&self, token: CancelToken) -> Result<(), BoxError> {
        // Each run gets a fresh serve loop to drain.
        self.finished.send_replace(false);
        *self.local_addr.lock().unwrap_or_else(PoisonError::into_inner) = None;
        let _finished = Finished(&self.finished);
        if token.is_cancelled() {
            return Ok(());
        }

        let listener = TcpListener::bind(&self.bind_address).await?;
        let addr = listener.local_addr()?;
        *self.local_addr.lock().unwrap_or_else(PoisonError::into_inner) = Some(addr);

        tracing::info!(server = %self.name, address = %addr, "HTTP server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        tracing::info!(server = %self.name, "HTTP server stopped");
        Ok(())
    }

    async fn stop(&self, _token: CancelToken) -> Result<(), BoxError> {
        let mut finished = self.finished.subscribe();
        finished.wait_for(|done| *done).await?;
        Ok(())
    }
}
