//! # Bus and Router Errors

use shared_types::HandlerError;
use thiserror::Error;

/// Errors from publish/subscribe operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus was closed.
    #[error("Bus closed")]
    Closed,

    /// Concrete topics must be non-empty and wildcard-free.
    #[error("Invalid publish topic: '{0}'")]
    InvalidTopic(String),

    /// Topic filter is not a valid MQTT filter.
    #[error("Invalid topic filter: '{0}'")]
    InvalidFilter(String),
}

/// Errors from route registration and execution.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route with this name is already registered.
    #[error("Handler '{0}' is already registered")]
    DuplicateHandler(String),

    /// No route with this name.
    #[error("No handler named '{0}'")]
    UnknownHandler(String),

    /// Subscribing a route's inbound topic failed.
    #[error("Failed to subscribe route '{route}': {source}")]
    Subscribe {
        route: String,
        #[source]
        source: BusError,
    },

    /// The route's handler function rejected the message.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}
