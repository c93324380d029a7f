//! # Handler Chain
//!
//! Ordered, init-gated list of command handlers with first-success dispatch.

use connector_telemetry::{COMMANDS_DISPATCHED, COMMANDS_UNDISPATCHED, HANDLERS_EXCLUDED};
use shared_types::{CloudSettings, ConnectionSettings, HandlerError, Message};
use tracing::{debug, info, warn};

use crate::ports::MessageHandler;

/// The active command handlers, in configuration order.
///
/// Immutable after [`HandlerChain::initialize`]; dispatch only reads it, so a
/// chain can be shared across route tasks behind an `Arc`.
pub struct HandlerChain {
    handlers: Vec<Box<dyn MessageHandler>>,
}

impl HandlerChain {
    /// Initialize each candidate once, in order, keeping those that succeed.
    ///
    /// A failed `init` is logged and the handler is dropped. It never aborts
    /// the chain; an empty chain is valid.
    pub fn initialize(
        candidates: Vec<Box<dyn MessageHandler>>,
        settings: &CloudSettings,
        connection: &ConnectionSettings,
    ) -> Self {
        let mut handlers = Vec::with_capacity(candidates.len());
        for mut handler in candidates {
            match handler.init(settings, connection) {
                Ok(()) => {
                    debug!(handler = handler.name(), "Command handler initialized");
                    handlers.push(handler);
                }
                Err(e) => {
                    warn!(
                        handler = handler.name(),
                        error = %e,
                        "Command handler excluded after failed initialization"
                    );
                    HANDLERS_EXCLUDED.with_label_values(&[handler.name()]).inc();
                }
            }
        }

        info!(active = handlers.len(), "Command handler chain ready");
        Self { handlers }
    }

    /// A chain with no handlers. Every dispatch fails.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Names of the active handlers, in dispatch order.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Offer the message to each active handler until one accepts it.
    ///
    /// Handlers after the accepting one are not invoked. If none accepts,
    /// the error names the payload.
    pub fn dispatch(&self, message: &Message) -> Result<Vec<Message>, HandlerError> {
        for handler in &self.handlers {
            match handler.handle(message) {
                Ok(outgoing) => {
                    debug!(
                        handler = handler.name(),
                        uuid = %message.uuid,
                        outgoing = outgoing.len(),
                        "Command handled"
                    );
                    COMMANDS_DISPATCHED
                        .with_label_values(&[handler.name()])
                        .inc();
                    return Ok(outgoing);
                }
                Err(e) => {
                    debug!(handler = handler.name(), uuid = %message.uuid, error = %e, "Handler declined");
                }
            }
        }

        COMMANDS_UNDISPATCHED.inc();
        Err(HandlerError::NoHandler {
            payload: message.payload_str(),
        })
    }
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.handler_names())
            .finish()
    }
}
