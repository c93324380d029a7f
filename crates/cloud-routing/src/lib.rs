//! # Cloud Routing
//!
//! Command routing and topic translation between a cloud IoT hub and the
//! local broker.
//!
//! ## Purpose
//!
//! - Receive cloud-to-device (C2D) messages, run them through an ordered
//!   chain of command handlers until one accepts, and forward the result to
//!   the local broker.
//! - Build the exact topic strings the hub and the local broker expect.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | A handler whose `init` failed is never in the active chain | `domain/chain.rs` - `HandlerChain::initialize()` |
//! | First handler to return `Ok` wins; later handlers are not invoked | `domain/chain.rs` - `HandlerChain::dispatch()` |
//! | Topic builders are pure and total | `domain/topics.rs` |
//! | Exactly one route per `command_bus` call | `bus/command.rs` - `command_bus()` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  bus/command.rs  - registers the command route with a Router    │
//! │  handlers/       - built-in command handlers                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs - MessageHandler trait                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/topics.rs - topic builders (no I/O)                     │
//! │  domain/chain.rs  - HandlerChain init gate and dispatch         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wiring
//!
//! ```ignore
//! use cloud_routing::{command_bus, EnvelopeCommandHandler, PassthroughCommandHandler};
//! use shared_bus::{InMemoryBus, Router};
//!
//! let mut router = Router::new();
//! let chain = command_bus(
//!     &mut router,
//!     local_bus,
//!     cloud_bus,
//!     &settings,
//!     &connection,
//!     vec![
//!         Box::new(EnvelopeCommandHandler::default()),
//!         Box::new(PassthroughCommandHandler::new()),
//!     ],
//! )?;
//! let running = router.run().await?;
//! ```

pub mod bus;
pub mod domain;
pub mod handlers;
pub mod ports;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bus::{command_bus, COMMAND_HANDLER_NAME};
pub use domain::{
    local_command_topic, remote_cloud_topic, telemetry_topic, CommandTopicForm, HandlerChain,
};
pub use handlers::{EnvelopeCommandHandler, PassthroughCommandHandler};
pub use ports::MessageHandler;
