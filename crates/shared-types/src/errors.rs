//! # Error Types
//!
//! Errors shared between the routing core, its handlers and the runtime.

use thiserror::Error;

/// Errors returned by command message handlers.
///
/// A handler signals that a message is not meant for it by returning an
/// error; the chain then moves on to the next handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The handler does not apply to this message.
    #[error("Message not applicable: {0}")]
    NotApplicable(String),

    /// The handler could not be initialized with the active settings.
    #[error("Handler initialization failed: {0}")]
    Init(String),

    /// The payload was recognized but could not be processed.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// No active handler accepted the message.
    #[error("no command message handler for message '{payload}'")]
    NoHandler { payload: String },
}

/// Errors preparing connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A required connection string property is absent.
    #[error("Connection string is missing '{0}'")]
    MissingProperty(&'static str),

    /// A connection string entry has no `=` separator.
    #[error("Malformed connection string entry: '{0}'")]
    MalformedEntry(String),

    /// The device identifier is empty.
    #[error("Device ID must not be empty")]
    EmptyDeviceId,
}

/// Errors decoding a command envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Payload is not a JSON envelope.
    #[error("Invalid envelope JSON: {0}")]
    Json(String),

    /// Envelope topic has too few segments.
    #[error("Invalid envelope topic: '{0}'")]
    InvalidTopic(String),

    /// Payload carries an envelope topic but the envelope does not decode.
    #[error("Malformed envelope: {0}")]
    Malformed(String),
}

impl From<EnvelopeError> for HandlerError {
    /// Foreign payloads are not applicable; broken envelopes are invalid.
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Json(_) => HandlerError::NotApplicable(err.to_string()),
            EnvelopeError::InvalidTopic(_) | EnvelopeError::Malformed(_) => {
                HandlerError::InvalidPayload(err.to_string())
            }
        }
    }
}
