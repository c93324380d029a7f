//! # Inbound Port
//!
//! The contract every cloud command handler implements.

use shared_types::{CloudSettings, ConnectionSettings, HandlerError, Message};

/// A pluggable cloud command handler.
///
/// Lifecycle: `init` is called exactly once, before any `handle`. A handler
/// whose `init` fails is never asked to `handle` anything.
///
/// `handle` returning `Err` means "not mine": the chain moves on to the next
/// handler. Returning `Ok` with an empty vector means the message was
/// consumed without output.
pub trait MessageHandler: Send + Sync {
    /// Stable identifier used in logs and metrics.
    fn name(&self) -> &str;

    /// Prepare the handler for the given settings.
    fn init(
        &mut self,
        settings: &CloudSettings,
        connection: &ConnectionSettings,
    ) -> Result<(), HandlerError>;

    /// Translate one cloud message into local broker messages.
    fn handle(&self, message: &Message) -> Result<Vec<Message>, HandlerError>;
}
