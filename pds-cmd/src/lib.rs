//! Command implementations for the PDS CLI.
//!
//! Provides subcommands for assessing panel soiling at a site from
//! Sentinel-2 NDVI, resolving addresses, and converting NDVI values.

use clap::Subcommand;

pub mod analyze;
pub mod config;
pub mod geocode;
pub mod soiling;

#[derive(Subcommand)]
pub enum Command {
    /// Assess panel soiling at a site over a date range
    Analyze(analyze::AnalyzeArgs),

    /// Resolve an address to coordinates
    Geocode {
        /// Free-text address, e.g. "Calle del Sol, Almería, Spain"
        address: String,

        /// Path to a TOML config file
        #[arg(short = 'c', long)]
        config: Option<std::path::PathBuf>,
    },

    /// Convert NDVI values to soiling percentages
    Soiling {
        /// One or more NDVI values
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Analyze(args) => analyze::run_analyze(args).await,
        Command::Geocode { address, config } => {
            geocode::run_geocode(&address, config.as_deref()).await
        }
        Command::Soiling { values } => {
            soiling::run_soiling(&values);
            Ok(())
        }
    }
}
