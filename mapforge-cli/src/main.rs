//! Mapforge CLI - command-line interface
//!
//! Thin front end over the mapforge library: loads a configuration file,
//! builds the map frame, and plans tile grids. All geometry lives in the
//! library.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mapforge", version, about = "Composite georeferenced map engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute the map frame from a configuration file
    Frame(commands::frame::FrameArgs),

    /// Plan a tile grid against the map frame
    Plan(commands::plan::PlanArgs),
}

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Frame(args) => commands::frame::run(args),
        Commands::Plan(args) => commands::plan::run(args),
    };

    if let Err(error) = result {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
