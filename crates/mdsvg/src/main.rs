//! mdsvg CLI - Inline SVG preprocessing for markdown.
//!
//! Provides commands for:
//! - `process`: Transform markdown content and write rendered HTML
//! - `check`: Verify inline SVG references without writing output

mod commands;
mod error;
mod output;
mod walk;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ProcessArgs};
use output::Output;

/// mdsvg - Inline SVG preprocessing for markdown.
#[derive(Parser)]
#[command(name = "mdsvg", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform markdown content and write rendered HTML.
    Process(ProcessArgs),
    /// Verify inline SVG references without writing output.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = match &cli.command {
        Commands::Process(args) => args.verbose,
        Commands::Check(args) => args.verbose,
    };

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Process(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
