//! Built-in command handlers.
//!
//! Default order: structured envelopes first, raw passthrough last as the
//! catch-all.

pub mod envelope;
pub mod passthrough;

pub use envelope::EnvelopeCommandHandler;
pub use passthrough::PassthroughCommandHandler;

/// Metadata key under which the passthrough handler keeps the cloud topic a
/// command arrived on.
pub const METADATA_CLOUD_TOPIC: &str = "cloud_topic";
