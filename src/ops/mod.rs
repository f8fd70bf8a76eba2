//! High-level operations behind the CLI commands.

pub mod build;
pub mod clean;
pub mod monitor;
pub mod scaffold;
pub mod upload;
