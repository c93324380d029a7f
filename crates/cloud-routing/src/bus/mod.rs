//! Bus Adapters - Router registration for command routing

pub mod command;

pub use command::{command_bus, COMMAND_HANDLER_NAME};
