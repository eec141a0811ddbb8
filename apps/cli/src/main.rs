//! TubeLab CLI — search trending YouTube channels and outlier videos.
//!
//! A thin front-end over the `tubelab-client` crate: search channels and
//! outliers, run niche scans, and look up video details from the terminal.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
