//! Prometheus metrics for the cloud connector.
//!
//! All metrics follow the naming convention: `connector_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // COMMAND ROUTING
    // =========================================================================

    /// Cloud commands accepted, by the handler that accepted them
    pub static ref COMMANDS_DISPATCHED: CounterVec = CounterVec::new(
        Opts::new(
            "connector_commands_dispatched_total",
            "Cloud commands accepted by a command handler"
        ),
        &["handler"]
    ).expect("metric creation failed");

    /// Cloud commands no handler accepted
    pub static ref COMMANDS_UNDISPATCHED: Counter = Counter::new(
        "connector_commands_undispatched_total",
        "Cloud commands rejected by every active command handler"
    ).expect("metric creation failed");

    /// Command handlers dropped because initialization failed
    pub static ref HANDLERS_EXCLUDED: CounterVec = CounterVec::new(
        Opts::new(
            "connector_handlers_excluded_total",
            "Command handlers excluded from the chain after failed initialization"
        ),
        &["handler"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all connector metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(COMMANDS_DISPATCHED.clone()),
        Box::new(COMMANDS_UNDISPATCHED.clone()),
        Box::new(HANDLERS_EXCLUDED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        register_metrics().expect("first");
        register_metrics().expect("second");
    }

    #[test]
    fn test_encode_contains_counters() {
        register_metrics().expect("register");
        COMMANDS_DISPATCHED.with_label_values(&["test_handler"]).inc();
        COMMANDS_UNDISPATCHED.inc();

        let text = encode_metrics().expect("encode");
        assert!(text.contains("connector_commands_dispatched_total"));
        assert!(text.contains("handler=\"test_handler\""));
        assert!(text.contains("connector_commands_undispatched_total"));
    }
}
