//! `compendium`: converts a JSON dump of scraped compendium categories.
//!
//! `compendium convert -i raw.json -o converted.json` runs one batch;
//! `compendium config init|show` manages `~/.compendium/compendium.toml`.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = commands::Cli::parse();
    commands::init_tracing(&cli);

    commands::run(cli).await
}
