//! lifecycle-app: run the configured servers until a termination signal.
//!
//! ```text
//! lifecycle-app --config app.toml
//!     → load & validate config
//!     → init logging
//!     → register one HttpServer per [[http]] entry
//!     → App::run until SIGTERM/SIGQUIT/SIGINT (or a server fails)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use lifecycle_app::config::{apply_overrides, load_config, AppConfig};
use lifecycle_app::observability::init_logging;
use lifecycle_app::{App, HttpServer, SignalKind};

#[derive(Parser, Debug)]
#[command(name = "lifecycle-app")]
#[command(version, about = "Run servers together and shut them down together", long_about = None)]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Signal to listen for (repeatable); replaces the configured set.
    #[arg(short, long = "signal")]
    signals: Vec<SignalKind>,

    /// Log level or filter directive; overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    let config = apply_overrides(config, args.signals, args.log_level)?;

    init_logging(&config.logging)?;

    tracing::info!(
        app = %config.name,
        servers = config.http.len(),
        "lifecycle-app v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let mut builder = App::builder()
        .name(config.name.clone())
        .signals(config.signals.iter().copied());
    for http in &config.http {
        builder = builder.server(Arc::new(HttpServer::from_config(http)));
    }
    let app = builder.build();

    for (server, endpoint) in app.endpoints() {
        match endpoint {
            Ok(endpoint) => tracing::info!(server = %server, endpoint = %endpoint, "Registered server"),
            Err(e) => tracing::warn!(server = %server, error = %e, "Registered server without endpoint"),
        }
    }

    match app.run().await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is_canceled() => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %e, "Shutdown after failure");
            Ok(ExitCode::FAILURE)
        }
    }
}
