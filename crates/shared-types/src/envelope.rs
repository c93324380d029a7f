//! # Command Envelope
//!
//! Structured representation of a cloud command's routing metadata, as it is
//! carried in the JSON payload of cloud-to-device messages:
//!
//! ```text
//! {
//!   "topic":   "org.acme/pump-01/things/live/messages/start",
//!   "headers": { "correlation-id": "4b1c..." },
//!   "path":    "/inbox/messages/start",
//!   "value":   { ... }
//! }
//! ```
//!
//! The topic is `{namespace}/{entityName}/{group}/{channel}/{criterion}[/{action}]`,
//! except for the `policies` group, which has no channel:
//! `{namespace}/{entityName}/policies/{criterion}[/{action}]`.
//! Only the namespace, entity name, action and correlation id participate in
//! local topic construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::EnvelopeError;

/// Header carrying the request/response correlation identifier.
pub const HEADER_CORRELATION_ID: &str = "correlation-id";

/// Group whose topics carry no channel segment.
pub const GROUP_POLICIES: &str = "policies";

const FIELD_TOPIC: &str = "topic";

/// Parsed envelope topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnvelopeTopic {
    pub namespace: String,
    pub entity_name: String,
    pub group: String,
    pub channel: String,
    pub criterion: String,
    /// Empty when the topic has no action segment. Message subjects may
    /// contain `/`, so everything after the criterion is kept verbatim.
    pub action: String,
}

impl FromStr for EnvelopeTopic {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EnvelopeError::InvalidTopic(s.to_string());

        let mut head = s.splitn(4, '/');
        let (Some(namespace), Some(entity_name), Some(group), Some(rest)) =
            (head.next(), head.next(), head.next(), head.next())
        else {
            return Err(invalid());
        };

        // Policy topics have no channel segment.
        let (channel, rest) = if group == GROUP_POLICIES {
            ("", rest)
        } else {
            rest.split_once('/').ok_or_else(invalid)?
        };
        let (criterion, action) = rest.split_once('/').unwrap_or((rest, ""));

        Ok(Self {
            namespace: namespace.to_string(),
            entity_name: entity_name.to_string(),
            group: group.to_string(),
            channel: channel.to_string(),
            criterion: criterion.to_string(),
            action: action.to_string(),
        })
    }
}

impl TryFrom<String> for EnvelopeTopic {
    type Error = EnvelopeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EnvelopeTopic> for String {
    fn from(topic: EnvelopeTopic) -> Self {
        topic.to_string()
    }
}

impl fmt::Display for EnvelopeTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.entity_name, self.group)?;
        if self.group != GROUP_POLICIES {
            write!(f, "/{}", self.channel)?;
        }
        write!(f, "/{}", self.criterion)?;
        if !self.action.is_empty() {
            write!(f, "/{}", self.action)?;
        }
        Ok(())
    }
}

/// Envelope headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(serde_json::Map<String, serde_json::Value>);

impl Headers {
    /// Empty header set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style header insertion.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Header value as a string, if present and textual.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    /// Correlation identifier, or `""` when the header is absent.
    #[must_use]
    pub fn correlation_id(&self) -> &str {
        self.get_str(HEADER_CORRELATION_ID).unwrap_or_default()
    }
}

/// Structured command descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub topic: EnvelopeTopic,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub value: serde_json::Value,
}

impl Envelope {
    /// Create an envelope with the given topic and headers.
    pub fn new(topic: EnvelopeTopic, headers: Headers) -> Self {
        Self {
            topic,
            headers,
            path: String::new(),
            value: serde_json::Value::Null,
        }
    }

    /// Decode an envelope from a JSON payload.
    ///
    /// A payload that is not a JSON object with a string `topic` is not an
    /// envelope ([`EnvelopeError::Json`]). One that has a topic but fails to
    /// decode is a broken envelope ([`EnvelopeError::InvalidTopic`] or
    /// [`EnvelopeError::Malformed`]).
    pub fn from_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| EnvelopeError::Json(e.to_string()))?;
        let topic = value
            .get(FIELD_TOPIC)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| EnvelopeError::Json("no string 'topic' field".to_string()))?;
        topic.parse::<EnvelopeTopic>()?;

        serde_json::from_value(value).map_err(|e| EnvelopeError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_parse_with_action() {
        let topic: EnvelopeTopic = "org.acme/pump-01/things/live/messages/start"
            .parse()
            .expect("valid topic");
        assert_eq!(topic.namespace, "org.acme");
        assert_eq!(topic.entity_name, "pump-01");
        assert_eq!(topic.group, "things");
        assert_eq!(topic.channel, "live");
        assert_eq!(topic.criterion, "messages");
        assert_eq!(topic.action, "start");
    }

    #[test]
    fn test_topic_action_keeps_slashes() {
        let topic: EnvelopeTopic = "ns/name/things/live/messages/a/b".parse().expect("valid");
        assert_eq!(topic.action, "a/b");
        assert_eq!(topic.to_string(), "ns/name/things/live/messages/a/b");
    }

    #[test]
    fn test_topic_without_action() {
        let topic: EnvelopeTopic = "ns/name/things/twin/search".parse().expect("valid");
        assert!(topic.action.is_empty());
        assert_eq!(topic.to_string(), "ns/name/things/twin/search");
    }

    #[test]
    fn test_topic_too_short() {
        let err = "ns/name/things".parse::<EnvelopeTopic>().unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTopic(_)));
    }

    #[test]
    fn test_envelope_from_json() {
        let json = br#"{
            "topic": "org.acme/pump-01/things/live/messages/start",
            "headers": {"correlation-id": "cid-42", "response-required": true},
            "path": "/inbox/messages/start",
            "value": {"speed": 3}
        }"#;
        let env = Envelope::from_slice(json).expect("valid envelope");
        assert_eq!(env.topic.action, "start");
        assert_eq!(env.headers.correlation_id(), "cid-42");
        assert_eq!(env.path, "/inbox/messages/start");
        assert_eq!(env.value["speed"], 3);
    }

    #[test]
    fn test_missing_correlation_id_is_empty() {
        let json = br#"{"topic": "ns/name/things/live/messages/stop"}"#;
        let env = Envelope::from_slice(json).expect("valid envelope");
        assert_eq!(env.headers.correlation_id(), "");
    }

    #[test]
    fn test_policy_topic_has_no_channel() {
        let topic: EnvelopeTopic = "org.acme/pump-01/policies/commands/create"
            .parse()
            .expect("valid");
        assert_eq!(topic.group, "policies");
        assert_eq!(topic.channel, "");
        assert_eq!(topic.criterion, "commands");
        assert_eq!(topic.action, "create");
        assert_eq!(topic.to_string(), "org.acme/pump-01/policies/commands/create");
    }

    #[test]
    fn test_policy_topic_too_short() {
        assert!("ns/name/policies".parse::<EnvelopeTopic>().is_err());
        let topic: EnvelopeTopic = "ns/name/policies/errors".parse().expect("valid");
        assert_eq!(topic.criterion, "errors");
        assert!(topic.action.is_empty());
    }

    #[test]
    fn test_things_topic_needs_criterion() {
        let err = "ns/name/things/live".parse::<EnvelopeTopic>().unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidTopic(_)));
    }

    #[test]
    fn test_envelope_rejects_garbage() {
        assert!(matches!(
            Envelope::from_slice(b"dummy_payload"),
            Err(EnvelopeError::Json(_))
        ));
        assert!(matches!(
            Envelope::from_slice(br#"{"speed": 3}"#),
            Err(EnvelopeError::Json(_))
        ));
        assert!(matches!(
            Envelope::from_slice(br#"{"topic": 7}"#),
            Err(EnvelopeError::Json(_))
        ));
    }

    #[test]
    fn test_broken_envelope_is_distinguished() {
        assert!(matches!(
            Envelope::from_slice(br#"{"topic": "a/b"}"#),
            Err(EnvelopeError::InvalidTopic(_))
        ));
        assert!(matches!(
            Envelope::from_slice(br#"{"topic": "ns/name/things/live/messages/x", "headers": 5}"#),
            Err(EnvelopeError::Malformed(_))
        ));
    }
}
