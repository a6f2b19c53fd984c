//! CDF debug bridge
//!
//! Starts the CDF debug backend and loads circuit debug files through it,
//! exposing the embedded sources as virtual documents.

use cdf_debug::{cli, commands::Commands, common::logging};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cdf-debug", about = "Debug Adapter Protocol bridge for CDF files")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    logging::init_cli();

    let cli = Cli::parse();

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
