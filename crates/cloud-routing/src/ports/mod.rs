//! Ports Layer - Trait seams between the chain and handler implementations

pub mod inbound;

pub use inbound::MessageHandler;
