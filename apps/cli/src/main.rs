//! boardcorpus CLI: export a Trello board as a plain-text corpus.
//!
//! Reads every card on one board, flattens it into a text record and writes
//! the records to a single artifact file.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
