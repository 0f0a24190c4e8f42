mod cli;
mod commands;
mod common;
mod enrich;
mod extract;
mod fetch;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use commands::run_enrich;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_enrich(cli)?;
    Ok(())
}
