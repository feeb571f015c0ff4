//! # divfeed CLI

use clap::Parser;

use crate::cli::Commands;

mod cli;

#[derive(Parser)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    divfeed::init().await;

    match &cli.command {
        Commands::Chart(cmd) => {
            cmd.exec().await;
        }
        Commands::Config(cmd) => {
            cmd.exec().await;
        }
        Commands::Dividends(cmd) => {
            cmd.exec().await;
        }
        Commands::Quote(cmd) => {
            cmd.exec().await;
        }
        Commands::Returns(cmd) => {
            cmd.exec().await;
        }
    }
}
