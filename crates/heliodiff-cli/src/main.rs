mod commands;
mod manifest;
mod render;
mod run_config;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heliodiff", about = "Heliospheric-imager CME review asset tool")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show FITS file metadata
    Info(commands::info::InfoArgs),
    /// Render a plain (optionally star-suppressed) frame
    Plain(commands::plain::PlainArgs),
    /// Render the difference of two adjacent frames
    Diff(commands::diff::DiffArgs),
    /// Produce the full asset set and manifest for an event window
    Run(commands::run::RunArgs),
    /// Emit a default run configuration as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Plain(args) => commands::plain::run(args),
        Commands::Diff(args) => commands::diff::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
