//! codepack command-line entry point

use anyhow::Result;
use clap::Parser;
use codepack_cli::commands::Commands;

/// Pack code/description corpora into pretraining instances
#[derive(Debug, Parser)]
#[command(name = "codepack", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
