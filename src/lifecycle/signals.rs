//! OS signal handling.
//!
//! # Responsibilities
//! - Register listeners for the configured termination signals
//! - Race signal arrival against the run's cancellation token
//! - Translate a received signal into cancellation
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Registration is owned by a `SignalSet`; dropping it stops delivery, so
//!   no process-wide listener outlives a run
//! - On non-Unix targets only SIGINT (Ctrl-C) can be observed

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;
use crate::lifecycle::token::{CancelReason, CancelToken};

/// Termination signals the orchestrator can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SignalKind {
    Terminate,
    Quit,
    Interrupt,
    Hangup,
    User1,
    User2,
}

/// Signals listened for when no override is configured.
pub const DEFAULT_SIGNALS: [SignalKind; 3] = [
    SignalKind::Terminate,
    SignalKind::Quit,
    SignalKind::Interrupt,
];

impl SignalKind {
    /// Conventional name, e.g. `SIGTERM`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Terminate => "SIGTERM",
            SignalKind::Quit => "SIGQUIT",
            SignalKind::Interrupt => "SIGINT",
            SignalKind::Hangup => "SIGHUP",
            SignalKind::User1 => "SIGUSR1",
            SignalKind::User2 => "SIGUSR2",
        }
    }

    #[cfg(unix)]
    fn to_unix(self) -> tokio::signal::unix::SignalKind {
        use tokio::signal::unix::SignalKind as Unix;
        match self {
            SignalKind::Terminate => Unix::terminate(),
            SignalKind::Quit => Unix::quit(),
            SignalKind::Interrupt => Unix::interrupt(),
            SignalKind::Hangup => Unix::hangup(),
            SignalKind::User1 => Unix::user_defined1(),
            SignalKind::User2 => Unix::user_defined2(),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized signal name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown signal: {0}")]
pub struct ParseSignalError(String);

impl FromStr for SignalKind {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("SIG").unwrap_or(&upper);
        match name {
            "TERM" => Ok(SignalKind::Terminate),
            "QUIT" => Ok(SignalKind::Quit),
            "INT" => Ok(SignalKind::Interrupt),
            "HUP" => Ok(SignalKind::Hangup),
            "USR1" => Ok(SignalKind::User1),
            "USR2" => Ok(SignalKind::User2),
            _ => Err(ParseSignalError(s.to_string())),
        }
    }
}

impl TryFrom<String> for SignalKind {
    type Error = ParseSignalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SignalKind> for String {
    fn from(kind: SignalKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A set of registered signal listeners.
pub struct SignalSet {
    #[cfg(unix)]
    streams: Vec<(SignalKind, tokio::signal::unix::Signal)>,
    #[cfg(not(unix))]
    interrupt: bool,
}

impl SignalSet {
    /// Register a listener for each kind in `kinds`.
    #[cfg(unix)]
    pub fn install(kinds: &[SignalKind]) -> Result<Self, AppError> {
        let mut streams = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let stream = tokio::signal::unix::signal(kind.to_unix())
                .map_err(|source| AppError::SignalInstall { signal: kind, source })?;
            streams.push((kind, stream));
        }
        tracing::debug!(signals = ?kinds, "Signal listeners installed");
        Ok(Self { streams })
    }

    /// Register a listener for each kind in `kinds`.
    #[cfg(not(unix))]
    pub fn install(kinds: &[SignalKind]) -> Result<Self, AppError> {
        let mut interrupt = false;
        for &kind in kinds {
            if kind == SignalKind::Interrupt {
                interrupt = true;
            } else {
                tracing::warn!(signal = %kind, "Signal not supported on this platform, ignoring");
            }
        }
        Ok(Self { interrupt })
    }

    /// Wait for any registered signal. Never resolves for an empty set.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> SignalKind {
        if self.streams.is_empty() {
            return std::future::pending().await;
        }

        let pending = self.streams.iter_mut().map(|(kind, stream)| {
            let kind = *kind;
            Box::pin(async move {
                match stream.recv().await {
                    Some(()) => kind,
                    None => std::future::pending().await,
                }
            })
        });

        let (kind, _, _) = futures_util::future::select_all(pending).await;
        kind
    }

    /// Wait for any registered signal. Never resolves for an empty set.
    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> SignalKind {
        if !self.interrupt {
            return std::future::pending().await;
        }
        match tokio::signal::ctrl_c().await {
            Ok(()) => SignalKind::Interrupt,
            Err(e) => {
                tracing::error!(error = %e, "Ctrl-C listener failed");
                std::future::pending().await
            }
        }
    }
}

/// Block until `token` is cancelled or a signal in `signals` arrives.
///
/// A signal cancels the token and counts as success; an outside cancellation
/// returns the token's error.
pub async fn listen(token: CancelToken, mut signals: SignalSet) -> Result<(), AppError> {
    tokio::select! {
        () = token.cancelled() => match token.err() {
            Some(err) => Err(err),
            None => Ok(()),
        },
        kind = signals.recv() => {
            tracing::info!(signal = %kind, "Signal received, shutting down");
            token.cancel_with(CancelReason::Signal(kind));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_signal_names() {
        assert_eq!("SIGTERM".parse(), Ok(SignalKind::Terminate));
        assert_eq!("quit".parse(), Ok(SignalKind::Quit));
        assert_eq!(" sigint ".parse(), Ok(SignalKind::Interrupt));
        assert_eq!("SIGUSR2".parse(), Ok(SignalKind::User2));
        assert!("SIGKILL".parse::<SignalKind>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for kind in [SignalKind::Hangup, SignalKind::User1] {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
    }

    #[test]
    fn test_default_signals() {
        assert_eq!(
            DEFAULT_SIGNALS,
            [SignalKind::Terminate, SignalKind::Quit, SignalKind::Interrupt]
        );
    }

    #[tokio::test]
    async fn test_empty_set_never_fires() {
        let mut set = SignalSet::install(&[]).unwrap();
        let res = tokio::time::timeout(Duration::from_millis(50), set.recv()).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn test_listen_returns_token_error() {
        let token = CancelToken::new();
        let set = SignalSet::install(&[]).unwrap();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let res = listen(token, set).await;
        assert!(matches!(res, Err(AppError::Canceled(CancelReason::Stopped))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_registers_each_kind() {
        let set = SignalSet::install(&[SignalKind::User1, SignalKind::User2]).unwrap();
        assert_eq!(set.streams.len(), 2);
    }
}
