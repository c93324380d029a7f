//! # Shared Bus - Publish/Subscribe Transport and Router
//!
//! The connector moves messages between two brokers: the cloud hub and the
//! local broker. Both are reached through the same two ports:
//!
//! - [`Publisher`]: publish messages to a concrete topic.
//! - [`Subscriber`]: subscribe to a topic filter and receive messages.
//!
//! A [`Router`] binds `subscription + handler + publisher` triples under a
//! name and runs one task per route.
//!
//! ```text
//!  cloud Subscriber ──► Router route ──► handler fn ──► local Publisher
//!   (topic filter)       "command_handler"   (0..n messages)
//! ```
//!
//! ## Topic Filters
//!
//! MQTT semantics: `+` matches exactly one level, a trailing `#` matches the
//! remaining levels (including none).

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod error;
pub mod publisher;
pub mod router;
pub mod subscriber;
pub mod topic;

// Re-export main types
pub use error::{BusError, RouterError};
pub use publisher::{InMemoryBus, NullPublisher, Publisher};
pub use router::{HandlerFunc, RouteInfo, Router, RunningRouter, TOPIC_EMPTY};
pub use subscriber::{MessageStream, Subscriber, Subscription};
pub use topic::{topic_matches, TopicFilter};

/// Maximum messages to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
