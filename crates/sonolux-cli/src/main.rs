//! Sonolux command-line interface.
//!
//! Run reconstruction jobs from TOML configuration files:
//! ```sh
//! sonolux run job.toml
//! sonolux validate job.toml
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sonolux")]
#[command(about = "Sonolux: Photoacoustic Time-Reversal Reconstruction")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconstruction job from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Validate a configuration file (including device-volume fit) without
    /// invoking the external solver.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            println!("Sonolux Time-Reversal Reconstruction");
            println!("====================================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());
            runner::run_job(&job)
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let derived = job.device.validate_against_volume(&job.volume)?;
            println!("Configuration is valid: {}", config.display());
            println!(
                "Derived sensor parameters: f_c={:.2} MHz, f_s={} MHz, bandwidth={}%",
                derived.center_frequency_hz / 1e6,
                derived.sampling_frequency_mhz,
                derived.bandwidth_percent
            );
            Ok(())
        }
    }
}
