//! Process lifecycle orchestration.
//!
//! Runs a fixed set of servers concurrently and shuts them all down together
//! when one fails, an OS termination signal arrives, or [`App::stop`] is
//! called. `App::run` returns the first error observed.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod servers;

pub use config::AppConfig;
pub use error::{AppError, BoxError};
pub use lifecycle::{App, AppBuilder, CancelReason, CancelToken, Server, SignalKind};
pub use servers::HttpServer;
