//! Solder CLI - create, build and upload AVR firmware projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use solder::util::shell::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("solder=debug")
    } else {
        EnvFilter::new("solder=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.no_color);

    // Execute command
    match cli.command {
        Commands::New(args) => commands::new::execute(args, &shell),
        Commands::Update(args) => commands::update::execute(args, &shell),
        Commands::Build(args) => commands::build::execute(args, &shell),
        Commands::Upload(args) => commands::upload::execute(args, &shell),
        Commands::Monitor(args) => commands::monitor::execute(args, &shell),
        Commands::Clean(args) => commands::clean::execute(args, &shell),
        Commands::Boards => commands::boards::execute(&shell),
        Commands::Package(args) => commands::package::execute(args, &shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
