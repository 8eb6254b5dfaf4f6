//! Trailhead CLI - Drive the rover simulation headless

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{inspect, simulate};

#[derive(Parser)]
#[command(name = "trailhead")]
#[command(about = "Rover-on-heightmap simulation, run headless", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session for a number of frames and report what happened
    Simulate {
        /// Heightmap to load (.raw little-endian u16, or .png)
        #[arg(long)]
        heightmap: PathBuf,

        /// Grid dimension of a .raw heightmap (inferred when omitted)
        #[arg(long)]
        dimension: Option<usize>,

        /// Extra config file layered over trailhead.toml
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rover model file (only its size is read)
        #[arg(long)]
        rover: Option<PathBuf>,

        /// Fixed frames to simulate
        #[arg(long, default_value = "600")]
        frames: u64,

        /// Drive script, e.g. "forward:120,left:30,drag:-40:10,reset:1"
        #[arg(long)]
        drive: Option<String>,

        /// Frame at which the start key is pressed
        #[arg(long, default_value = "1")]
        start_at: u64,

        /// Play sound through the default device
        #[arg(long)]
        audio: bool,

        /// Print the final frame snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Describe a heightmap
    Inspect {
        /// Heightmap to inspect (.raw or .png)
        heightmap: PathBuf,

        /// Grid dimension of a .raw heightmap (inferred when omitted)
        #[arg(long)]
        dimension: Option<usize>,

        /// Extra config file layered over trailhead.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Simulate {
            heightmap,
            dimension,
            config,
            rover,
            frames,
            drive,
            start_at,
            audio,
            json,
        } => simulate::run(simulate::SimulateArgs {
            heightmap,
            dimension,
            config,
            rover,
            frames,
            drive,
            start_at,
            audio,
            json,
        }),
        Commands::Inspect {
            heightmap,
            dimension,
            config,
        } => inspect::run(&heightmap, dimension, config.as_deref()),
    }
}
