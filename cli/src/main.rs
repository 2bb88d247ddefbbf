//! Kitchen Marathon - ephemeral test instances on Marathon/Mesos

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use kitchen_marathon::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // Flags may arrive from the environment (NO_COLOR), so a missing
        // subcommand is not always an empty command line.
        Err(e) if e.kind() == ErrorKind::MissingSubcommand => {
            eprintln!("{}", Cli::command().render_help());
            std::process::exit(2);
        }
        Err(e) => e.exit(),
    };
    if let Err(e) = cli.run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
