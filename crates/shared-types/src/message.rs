//! # Bus Message
//!
//! The unit of transfer between subscribers, handlers and publishers.
//! A message owns its payload; handlers never mutate an incoming message,
//! they produce new ones that the router then publishes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Metadata key naming the handler that produced an outgoing message.
pub const METADATA_HANDLER_NAME: &str = "handler_name";

/// Metadata key carrying the concrete topic of a message.
///
/// Subscriptions set it to the topic the message arrived on; handlers set it
/// to the destination when the route has no fixed publish topic.
pub const METADATA_TOPIC: &str = "topic";

/// String metadata attached to a message.
pub type Metadata = HashMap<String, String>;

/// Opaque payload with a unique identifier and string metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub uuid: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
    /// Arbitrary key/value metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl Message {
    /// Create a message with an explicit identifier.
    pub fn new(uuid: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            uuid: uuid.into(),
            payload: payload.into(),
            metadata: Metadata::new(),
        }
    }

    /// Create a message with a freshly generated v4 identifier.
    pub fn with_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(Uuid::new_v4().to_string(), payload)
    }

    /// Look up a metadata value.
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Set a metadata value, replacing any previous one.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`Message::set_metadata`].
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_metadata(key, value);
        self
    }

    /// Payload rendered as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Topic recorded in the metadata, if any.
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.metadata_value(METADATA_TOPIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Message::with_payload("a");
        let b = Message::with_payload("a");
        assert_ne!(a.uuid, b.uuid);
        assert!(Uuid::parse_str(&a.uuid).is_ok());
    }

    #[test]
    fn test_metadata_access() {
        let msg = Message::new("id-1", "payload")
            .with_metadata(METADATA_TOPIC, "c//ns:thing/q//start")
            .with_metadata(METADATA_HANDLER_NAME, "h1");

        assert_eq!(msg.topic(), Some("c//ns:thing/q//start"));
        assert_eq!(msg.metadata_value(METADATA_HANDLER_NAME), Some("h1"));
        assert_eq!(msg.metadata_value("missing"), None);
    }

    #[test]
    fn test_payload_str_lossy() {
        let msg = Message::new("id", vec![b'o', b'k', 0xFF]);
        assert!(msg.payload_str().starts_with("ok"));
    }
}
