//! Topic builders for the cloud hub and the local broker.
//!
//! These strings are an external protocol contract and must match
//! byte-for-byte:
//!
//! | Purpose | Format |
//! |---------|--------|
//! | Cloud subscription | `devices/{deviceID}/messages/devicebound/#` |
//! | Cloud telemetry | `devices/{deviceID}/messages/events/{urlencoded-properties}` |
//! | Local command (long) | `command//{namespace}:{entityName}/req/{correlationID}/{action}` |
//! | Local command (short) | `c//{namespace}:{entityName}/q/{correlationID}/{action}` |
//!
//! Inputs are not validated; every function is total.

use std::fmt;
use std::str::FromStr;

use shared_types::Envelope;
use url::form_urlencoded;

const KEY_MESSAGE_ID: &str = "$.mid";
const KEY_CONTENT_TYPE: &str = "$.ct";
const KEY_CONTENT_ENCODING: &str = "$.ce";
const CONTENT_TYPE: &str = "application/json";
const CONTENT_ENCODING: &str = "utf-8";

/// Which local command topic template to render.
///
/// Picked by the caller to match the deployed local broker contract, never
/// derived from envelope content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandTopicForm {
    /// `command//{namespace}:{entityName}/req/{correlationID}/{action}`
    #[default]
    Long,
    /// `c//{namespace}:{entityName}/q/{correlationID}/{action}`
    Short,
}

impl FromStr for CommandTopicForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            other => Err(format!("unknown command topic form '{other}'")),
        }
    }
}

impl fmt::Display for CommandTopicForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.write_str("long"),
            Self::Short => f.write_str("short"),
        }
    }
}

/// Cloud subscription pattern for all device-bound messages of a device.
#[must_use]
pub fn remote_cloud_topic(device_id: &str) -> String {
    format!("devices/{device_id}/messages/devicebound/#")
}

/// Cloud publish topic for device telemetry.
///
/// Properties are form-urlencoded in the order content type, content
/// encoding, message id. The message id is omitted when empty.
///
/// Escaping follows `application/x-www-form-urlencoded`, which differs from
/// Go's `url.Values.Encode` on `~` (escaped here) and `*` (kept here). Compare
/// decoded pairs, not raw strings.
#[must_use]
pub fn telemetry_topic(device_id: &str, message_id: &str) -> String {
    let mut props = form_urlencoded::Serializer::new(String::new());
    props
        .append_pair(KEY_CONTENT_TYPE, CONTENT_TYPE)
        .append_pair(KEY_CONTENT_ENCODING, CONTENT_ENCODING);
    if !message_id.is_empty() {
        props.append_pair(KEY_MESSAGE_ID, message_id);
    }
    format!("devices/{device_id}/messages/events/{}", props.finish())
}

/// Local broker topic for a cloud command.
///
/// A missing correlation id renders as an empty segment.
#[must_use]
pub fn local_command_topic(envelope: &Envelope, form: CommandTopicForm) -> String {
    let topic = &envelope.topic;
    let correlation_id = envelope.headers.correlation_id();
    match form {
        CommandTopicForm::Long => format!(
            "command//{}:{}/req/{}/{}",
            topic.namespace, topic.entity_name, correlation_id, topic.action
        ),
        CommandTopicForm::Short => format!(
            "c//{}:{}/q/{}/{}",
            topic.namespace, topic.entity_name, correlation_id, topic.action
        ),
    }
}
