//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! App, TaskGroup, signal listener, servers
//!     → tracing events inside the per-run `app_run` span (app, run_id)
//!     → logging.rs subscriber (pretty, compact or JSON on stdout)
//! ```

pub mod logging;

pub use logging::{init_logging, LoggingError};
