//! # Connector Telemetry
//!
//! Logging and metrics for the cloud connector.
//!
//! - **Logs**: `tracing` events rendered by `tracing-subscriber`, plain text
//!   for development, JSON for log shippers.
//! - **Metrics**: Prometheus counters for command dispatch and handler
//!   initialization, exposed in the text exposition format.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use connector_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CONNECTOR_SERVICE_NAME` / `OTEL_SERVICE_NAME` | `cloud-connector` | Service name in logs |
//! | `CONNECTOR_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CONNECTOR_JSON_LOGS` | `false` | Emit JSON log lines |
//! | `CONNECTOR_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingHandle};
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, COMMANDS_DISPATCHED, COMMANDS_UNDISPATCHED,
    HANDLERS_EXCLUDED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let logging = init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        _logging: logging,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingHandle,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
