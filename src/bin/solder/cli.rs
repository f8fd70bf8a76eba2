//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

/// Solder - create, build and upload AVR firmware projects
#[derive(Parser)]
#[command(name = "solder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new Solder project
    New(NewArgs),

    /// Update an existing Solder project
    Update(UpdateArgs),

    /// Build the project with cmake and make
    Build(BuildArgs),

    /// Upload the firmware over serial
    Upload(UploadArgs),

    /// Open a serial monitor
    Monitor(MonitorArgs),

    /// Remove build artifacts
    Clean(CleanArgs),

    /// List the supported boards
    Boards,

    /// Manage library dependencies
    Package(PackageArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct NewArgs {
    /// Board to configure the project for
    #[arg(long)]
    pub board: String,

    /// Directory to create the project in (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Create a project structure for a specific IDE (currently: clion)
    #[arg(long)]
    pub ide: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Switch the project to another board
    #[arg(long)]
    pub board: Option<String>,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Switch the IDE integration (currently: clion)
    #[arg(long)]
    pub ide: Option<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Makefile generator to use (defaults to the detected make flavor)
    #[arg(long)]
    pub generator: Option<String>,

    /// Path to the cmake binary
    #[arg(long)]
    pub cmake: Option<PathBuf>,

    /// Path to the make binary
    #[arg(long)]
    pub make: Option<PathBuf>,
}

#[derive(Args)]
pub struct UploadArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Serial port to upload to (default: automatic)
    #[arg(long)]
    pub port: Option<String>,
}

#[derive(Args)]
pub struct MonitorArgs {
    /// Serial port to monitor (default: automatic)
    #[arg(long)]
    pub port: Option<String>,

    /// Baud rate (default: 9600)
    #[arg(long)]
    pub baud: Option<u32>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct PackageArgs {
    #[command(subcommand)]
    pub command: PackageCommands,
}

#[derive(Subcommand)]
pub enum PackageCommands {
    /// Install packages from spec strings
    Install(PackageSpecArgs),

    /// Uninstall packages
    Remove(PackageSpecArgs),

    /// Update all installed packages
    Update(PackageUpdateArgs),
}

#[derive(Args)]
pub struct PackageSpecArgs {
    /// Package specs: `(URL|owner/repo)[:branch][@version][ at path]`
    #[arg(required = true)]
    pub specs: Vec<String>,

    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct PackageUpdateArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
