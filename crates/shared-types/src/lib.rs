//! # Shared Types Crate
//!
//! Types that cross the boundary between the transport, the command routing
//! core and the runtime wiring.
//!
//! ## Contents
//!
//! - [`Message`]: opaque payload plus string metadata, the unit the bus moves.
//! - [`Envelope`]: structured command descriptor (topic + headers) carried in
//!   cloud-to-device payloads.
//! - [`CloudSettings`] / [`ConnectionSettings`]: device identity and hub
//!   connection parameters.
//! - Error types shared by handlers and settings preparation.

pub mod envelope;
pub mod errors;
pub mod message;
pub mod settings;

pub use envelope::{Envelope, EnvelopeTopic, Headers};
pub use errors::*;
pub use message::{Message, Metadata, METADATA_HANDLER_NAME, METADATA_TOPIC};
pub use settings::{CloudSettings, ConnectionSettings};
