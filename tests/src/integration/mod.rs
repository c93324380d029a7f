//! Integration flows.

mod command_flow;
