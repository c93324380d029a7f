//! Raw command passthrough to a fixed local topic.

use shared_bus::topic::validate_publish_topic;
use shared_types::{
    CloudSettings, ConnectionSettings, HandlerError, Message, METADATA_HANDLER_NAME,
    METADATA_TOPIC,
};

use super::METADATA_CLOUD_TOPIC;
use crate::ports::MessageHandler;

/// Handler name used in logs and metrics.
pub const PASSTHROUGH_HANDLER_NAME: &str = "passthrough_command";

/// Forwards every cloud command, unchanged, to the configured passthrough
/// command topic. Accepts anything, so it belongs at the end of the chain.
///
/// Not usable without a passthrough topic: `init` fails and the chain drops
/// it.
#[derive(Debug, Default)]
pub struct PassthroughCommandHandler {
    topic: String,
}

impl PassthroughCommandHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageHandler for PassthroughCommandHandler {
    fn name(&self) -> &str {
        PASSTHROUGH_HANDLER_NAME
    }

    fn init(
        &mut self,
        settings: &CloudSettings,
        _connection: &ConnectionSettings,
    ) -> Result<(), HandlerError> {
        let topic = settings.passthrough_command_topic.trim();
        if topic.is_empty() {
            return Err(HandlerError::Init(
                "passthrough command topic is not configured".to_string(),
            ));
        }
        validate_publish_topic(topic).map_err(|e| HandlerError::Init(e.to_string()))?;
        self.topic = topic.to_string();
        Ok(())
    }

    fn handle(&self, message: &Message) -> Result<Vec<Message>, HandlerError> {
        if self.topic.is_empty() {
            return Err(HandlerError::NotApplicable(
                "passthrough handler is not initialized".to_string(),
            ));
        }

        let mut out = Message::new(message.uuid.clone(), message.payload.clone())
            .with_metadata(METADATA_TOPIC, self.topic.clone())
            .with_metadata(METADATA_HANDLER_NAME, PASSTHROUGH_HANDLER_NAME);
        if let Some(cloud_topic) = message.topic() {
            out.set_metadata(METADATA_CLOUD_TOPIC, cloud_topic);
        }
        Ok(vec![out])
    }
}
