//! # Command Bus
//!
//! Registers the cloud-to-device command route:
//!
//! ```text
//! cloud  devices/{id}/messages/devicebound/#
//!   └─► "command_handler" ─► HandlerChain::dispatch ─► local (per-message topic)
//! ```

use std::sync::Arc;

use shared_bus::{Publisher, Router, RouterError, Subscriber, TOPIC_EMPTY};
use shared_types::{CloudSettings, ConnectionSettings};
use tracing::info;

use crate::domain::{remote_cloud_topic, HandlerChain};
use crate::ports::MessageHandler;

/// Route name of the cloud command route.
pub const COMMAND_HANDLER_NAME: &str = "command_handler";

/// Build the handler chain and register the command route on `router`.
///
/// The route publishes with an empty topic, so each outgoing message goes to
/// the topic its handler put in its metadata. An empty chain is registered
/// like any other; its dispatch always fails.
///
/// # Errors
///
/// Only if `router` already has a route named [`COMMAND_HANDLER_NAME`].
pub fn command_bus(
    router: &mut Router,
    local_publisher: Arc<dyn Publisher>,
    cloud_subscriber: Arc<dyn Subscriber>,
    settings: &CloudSettings,
    connection: &ConnectionSettings,
    handlers: Vec<Box<dyn MessageHandler>>,
) -> Result<Arc<HandlerChain>, RouterError> {
    let chain = Arc::new(HandlerChain::initialize(handlers, settings, connection));
    let subscribe_topic = remote_cloud_topic(&connection.device_id);

    let route_chain = Arc::clone(&chain);
    router.add_handler(
        COMMAND_HANDLER_NAME,
        subscribe_topic.as_str(),
        cloud_subscriber,
        TOPIC_EMPTY,
        local_publisher,
        move |message| route_chain.dispatch(message),
    )?;

    info!(
        device_id = %connection.device_id,
        subscribe_topic = %subscribe_topic,
        handlers = ?chain.handler_names(),
        "Command bus registered"
    );
    Ok(chain)
}
