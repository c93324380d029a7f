//! # Cloud Connector Test Suite
//!
//! Cross-crate flows over in-memory brokers.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Cloud broker ──► router ──► local broker
//!     └── command_flow.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p connector-tests
//! ```

pub mod integration;
