//! swiftcodes: SWIFT/BIC code registry service.
//!
//! Seeds a local registry from the canonical CSV and serves lookups by code
//! and by country over HTTP.

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
