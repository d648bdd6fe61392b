//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! App::run (app.rs):
//!     install signal listeners → spawn tasks into a TaskGroup → wait
//!
//! TaskGroup (group.rs):
//!     first failing task → record error → cancel token
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGQUIT/SIGINT → cancel token → every server's stop()
//!
//! CancelToken (token.rs):
//!     Active → Cancelled, observed by every task
//! ```
//!
//! # Design Decisions
//! - One token per app; every shutdown path flips it
//! - No shutdown deadline in the core; wrap the token for one
//! - First error wins, later errors are dropped

pub mod app;
pub mod group;
pub mod server;
pub mod signals;
pub mod token;

pub use app::{App, AppBuilder};
pub use group::TaskGroup;
pub use server::Server;
pub use signals::{SignalKind, SignalSet, DEFAULT_SIGNALS};
pub use token::{CancelReason, CancelToken};
