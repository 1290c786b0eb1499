//! docpress CLI — documentation site build orchestrator.
//!
//! Sequences the clean/build/copy publish cycle around an external
//! documentation generator and verifies the search index artifact it emits.

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
