//! # Connector Runtime
//!
//! Assembles the cloud connector from its parts:
//!
//! 1. [`ConnectorConfig`] from the environment.
//! 2. Logging and Prometheus metrics initialized from its telemetry section.
//! 3. Command routing wired onto a [`Router`](shared_bus::Router) with
//!    [`wire_command_routing`].
//! 4. The router started, one task per route.
//!
//! Broker clients are supplied by the caller as `Publisher` / `Subscriber`
//! implementations.

pub mod config;
pub mod wiring;

pub use config::{ConfigError, ConnectorConfig};
pub use wiring::{default_command_handlers, wire_command_routing};

use std::sync::Arc;

use anyhow::{Context, Result};
use cloud_routing::HandlerChain;
use connector_telemetry::{init_telemetry, TelemetryGuard};
use shared_bus::{Publisher, Router, RunningRouter, Subscriber};
use tracing::info;

/// A started connector.
pub struct Connector {
    router: RunningRouter,
    chain: Arc<HandlerChain>,
    _telemetry: TelemetryGuard,
}

impl Connector {
    /// Initialize telemetry, wire command routing between `cloud` and
    /// `local` and start routing.
    ///
    /// Telemetry tolerates a global subscriber installed earlier.
    pub async fn start(
        config: &ConnectorConfig,
        local: Arc<dyn Publisher>,
        cloud: Arc<dyn Subscriber>,
    ) -> Result<Self> {
        let telemetry =
            init_telemetry(config.telemetry.clone()).context("Failed to initialize telemetry")?;

        let mut router = Router::new();
        let chain = wire_command_routing(&mut router, local, cloud, config)?;
        let router = router.run().await.context("Failed to start router")?;

        info!(routes = router.route_count(), "Connector started");
        Ok(Self {
            router,
            chain,
            _telemetry: telemetry,
        })
    }

    /// The active command handler chain.
    #[must_use]
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Stop routing and wait for every route task.
    pub async fn shutdown(self) {
        self.router.close().await;
        info!("Connector stopped");
    }
}
