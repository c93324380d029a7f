//! Domain Layer - Pure routing logic
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod chain;
pub mod topics;

pub use chain::HandlerChain;
pub use topics::{local_command_topic, remote_cloud_topic, telemetry_topic, CommandTopicForm};
