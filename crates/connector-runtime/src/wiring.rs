//! # Command Routing Wiring
//!
//! Binds the cloud command route to concrete brokers:
//!
//! ```text
//! cloud Subscriber ──► command_handler ──► [command_envelope, passthrough_command] ──► local Publisher
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use cloud_routing::{
    command_bus, CommandTopicForm, EnvelopeCommandHandler, HandlerChain, MessageHandler,
    PassthroughCommandHandler,
};
use shared_bus::{Publisher, Router, Subscriber};
use tracing::info;

use crate::config::ConnectorConfig;

/// Built-in command handlers in dispatch order. The passthrough catch-all
/// goes last.
#[must_use]
pub fn default_command_handlers(form: CommandTopicForm) -> Vec<Box<dyn MessageHandler>> {
    vec![
        Box::new(EnvelopeCommandHandler::new(form)),
        Box::new(PassthroughCommandHandler::new()),
    ]
}

/// Register the command route on `router` with the built-in handlers.
pub fn wire_command_routing(
    router: &mut Router,
    local: Arc<dyn Publisher>,
    cloud: Arc<dyn Subscriber>,
    config: &ConnectorConfig,
) -> Result<Arc<HandlerChain>> {
    let connection = config
        .connection_settings()
        .context("Failed to prepare cloud connection settings")?;

    let chain = command_bus(
        router,
        local,
        cloud,
        &config.cloud,
        &connection,
        default_command_handlers(config.topic_form),
    )
    .context("Failed to register command route")?;

    info!(
        device_id = %connection.device_id,
        topic_form = %config.topic_form,
        active_handlers = chain.len(),
        "Command routing wired"
    );
    Ok(chain)
}
