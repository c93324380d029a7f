//! Structured command envelopes to local command topics.

use shared_types::{
    CloudSettings, ConnectionSettings, Envelope, HandlerError, Message, METADATA_HANDLER_NAME,
    METADATA_TOPIC,
};
use tracing::debug;

use crate::domain::{local_command_topic, CommandTopicForm};
use crate::ports::MessageHandler;

/// Handler name used in logs and metrics.
pub const ENVELOPE_HANDLER_NAME: &str = "command_envelope";

/// Accepts payloads that decode as an [`Envelope`] carrying an action and
/// republishes them unchanged on the matching local command topic.
#[derive(Debug, Default)]
pub struct EnvelopeCommandHandler {
    form: CommandTopicForm,
    device_id: String,
}

impl EnvelopeCommandHandler {
    #[must_use]
    pub fn new(form: CommandTopicForm) -> Self {
        Self {
            form,
            device_id: String::new(),
        }
    }

    #[must_use]
    pub fn form(&self) -> CommandTopicForm {
        self.form
    }
}

impl MessageHandler for EnvelopeCommandHandler {
    fn name(&self) -> &str {
        ENVELOPE_HANDLER_NAME
    }

    fn init(
        &mut self,
        _settings: &CloudSettings,
        connection: &ConnectionSettings,
    ) -> Result<(), HandlerError> {
        self.device_id.clone_from(&connection.device_id);
        Ok(())
    }

    fn handle(&self, message: &Message) -> Result<Vec<Message>, HandlerError> {
        let envelope = Envelope::from_slice(&message.payload)?;
        if envelope.topic.action.is_empty() {
            return Err(HandlerError::NotApplicable(format!(
                "envelope topic '{}' has no action",
                envelope.topic
            )));
        }

        let topic = local_command_topic(&envelope, self.form);
        debug!(
            device_id = %self.device_id,
            uuid = %message.uuid,
            topic = %topic,
            "Envelope command routed"
        );

        Ok(vec![Message::new(message.uuid.clone(), message.payload.clone())
            .with_metadata(METADATA_TOPIC, topic)
            .with_metadata(METADATA_HANDLER_NAME, ENVELOPE_HANDLER_NAME)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::dummy_settings;

    const COMMAND: &str = r#"{
        "topic": "org.acme/pump-01/things/live/messages/start",
        "headers": { "correlation-id": "cid-42", "content-type": "application/json" },
        "path": "/inbox/messages/start",
        "value": { "speed": 3 }
    }"#;

    fn initialized(form: CommandTopicForm) -> EnvelopeCommandHandler {
        let (settings, connection) = dummy_settings();
        let mut handler = EnvelopeCommandHandler::new(form);
        handler.init(&settings, &connection).expect("init");
        handler
    }

    #[test]
    fn test_routes_envelope_to_long_topic() {
        let handler = initialized(CommandTopicForm::Long);
        let inbound = Message::new("m-1", COMMAND);

        let out = handler.handle(&inbound).expect("handled");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].topic(), Some("command//org.acme:pump-01/req/cid-42/start"));
        assert_eq!(out[0].metadata_value(METADATA_HANDLER_NAME), Some("command_envelope"));
        assert_eq!(out[0].payload, inbound.payload);
        assert_eq!(out[0].uuid, "m-1");
    }

    #[test]
    fn test_routes_envelope_to_short_topic() {
        let handler = initialized(CommandTopicForm::Short);
        let out = handler
            .handle(&Message::with_payload(COMMAND))
            .expect("handled");
        assert_eq!(out[0].topic(), Some("c//org.acme:pump-01/q/cid-42/start"));
    }

    #[test]
    fn test_declines_non_json() {
        let handler = initialized(CommandTopicForm::Long);
        let err = handler
            .handle(&Message::with_payload("dummy_payload"))
            .unwrap_err();
        assert!(matches!(err, HandlerError::NotApplicable(_)));
    }

    #[test]
    fn test_broken_envelope_is_invalid_payload() {
        let handler = initialized(CommandTopicForm::Long);
        let err = handler
            .handle(&Message::with_payload(r#"{"topic": "org.acme/pump-01"}"#))
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidPayload(_)));
    }

    #[test]
    fn test_routes_policy_command() {
        let handler = initialized(CommandTopicForm::Long);
        let payload = r#"{
            "topic": "org.acme/pump-01/policies/commands/create",
            "headers": { "correlation-id": "cid-9" }
        }"#;
        let out = handler.handle(&Message::with_payload(payload)).expect("handled");
        assert_eq!(out[0].topic(), Some("command//org.acme:pump-01/req/cid-9/create"));
    }

    #[test]
    fn test_declines_envelope_without_action() {
        let handler = initialized(CommandTopicForm::Long);
        let payload = r#"{"topic": "org.acme/pump-01/things/twin/commands", "headers": {}}"#;
        let err = handler.handle(&Message::with_payload(payload)).unwrap_err();
        assert!(matches!(err, HandlerError::NotApplicable(_)));
    }

    #[test]
    fn test_default_form_is_long() {
        assert_eq!(EnvelopeCommandHandler::default().form(), CommandTopicForm::Long);
        assert_eq!(EnvelopeCommandHandler::default().name(), "command_envelope");
    }
}
