//! mobsec CLI
//!
//! Runs device security checks against a recorded snapshot or the local host.

mod commands;

use clap::{Parser, Subcommand};
use mobsec_core::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// mobsec - run device security checks
#[derive(Parser)]
#[command(name = "mobsec")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run security checks
    Scan(commands::scan::ScanArgs),

    /// List available security checks
    List,

    /// Show what the environment reports for every probe
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.general.verbose |= cli.verbose;
    if let Some(format) = cli.format {
        config.general.output_format = format;
    }

    // Initialize logging
    let filter = if config.general.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Scan(args) => commands::scan::run(args, config),
        Commands::List => commands::list::run(),
        Commands::Info(args) => commands::info::run(args, &config),
    }
}
