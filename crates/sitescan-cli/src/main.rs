//! sitescan CLI - list the pages a website publishes through its sitemaps

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::initialize_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    match &cli.command {
        Commands::Pages(args) => commands::pages(args).await,
        Commands::Robots(args) => commands::robots(args).await,
    }
}
