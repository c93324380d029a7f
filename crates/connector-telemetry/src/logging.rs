//! Structured logging.
//!
//! JSON lines carry `timestamp`, `level`, `target`, `fields` and the span
//! context, which log shippers can parse without extra configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{TelemetryConfig, TelemetryError};

/// Handle returned by [`init_logging`].
pub struct LoggingHandle {
    /// False when another global subscriber was already installed.
    pub installed: bool,
}

/// Install the global `tracing` subscriber.
///
/// A subscriber installed earlier (tests, embedding applications) is left in
/// place; that is reported through [`LoggingHandle::installed`], not as an
/// error.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingHandle, TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level '{}': {}", config.log_level, e)))?;

    let fmt_layer = if !config.console_output {
        None
    } else if config.json_logs {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        )
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(true)
                .boxed(),
        )
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("Global subscriber already installed, keeping it");
    }

    Ok(LoggingHandle { installed })
}

