//! Command implementations

pub mod boards;
pub mod build;
pub mod clean;
pub mod completions;
pub mod monitor;
pub mod new;
pub mod package;
pub mod update;
pub mod upload;
