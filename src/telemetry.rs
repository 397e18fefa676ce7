//! Tracing subscriber installation for binaries.
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to whichever binary embeds the crate.

use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "CRAFTMESSAGE_LOG";

/// Filter used when neither [`LOG_ENV_VAR`] nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Builds the filter from [`LOG_ENV_VAR`], then `RUST_LOG`, then
/// [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a formatted subscriber writing to stderr.
///
/// # Errors
///
/// Returns [`TelemetryError::Init`] when a global subscriber is already set.
pub fn init_tracing() -> Result<(), TelemetryError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
