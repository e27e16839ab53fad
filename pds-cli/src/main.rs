//! PDS CLI - Command line tool for solar panel dust surveys.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "pds",
    version,
    about = "Solar panel soiling estimates from Sentinel-2 NDVI"
)]
struct Cli {
    #[command(subcommand)]
    command: pds_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    pds_cmd::run(cli.command).await
}
