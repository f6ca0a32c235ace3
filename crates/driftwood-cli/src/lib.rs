//! driftwood-cli library root.
//!
//! Re-exports the config layer and command handlers so integration tests
//! can drive them without going through argument parsing.

pub mod commands;
pub mod config;
