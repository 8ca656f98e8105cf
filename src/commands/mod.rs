//! CLI command implementations for memtop.
//!
//! This module provides implementations for all CLI subcommands:
//! - `snapshot`: Single-shot process table
//! - `check`: System validation
//! - `config`: Configuration file generation

pub mod check;
pub mod config;
pub mod snapshot;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use snapshot::command_snapshot;
