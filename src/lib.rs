//! Solder - create, build and upload AVR firmware projects
//!
//! This crate provides the core library functionality for Solder,
//! including project scaffolding, CMake/make build orchestration, and a
//! submodule-based package manager for third-party firmware libraries.

pub mod core;
pub mod ops;
pub mod pkg;
pub mod templates;
pub mod util;

pub use crate::core::{board::BoardRegistry, config::UserConfig, settings::Settings};
pub use crate::pkg::{InstallOutcome, Package, PackageManager, RemoveOutcome};
pub use crate::util::context::{GlobalContext, ProjectLayout};
pub use crate::util::shell::Shell;
