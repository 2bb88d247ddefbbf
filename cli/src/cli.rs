//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::commands::lifecycle::Action;

/// Ephemeral test instances on Marathon/Mesos
#[derive(Parser)]
#[command(
    name = "kitchen-marathon",
    version,
    propagate_version = true,
    subcommand_required = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Driver config file [default: ./.kitchen-marathon.yml]
    #[arg(short, long, global = true, env = "KITCHEN_MARATHON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Instance name [default: instance_name from config, else directory name]
    #[arg(short, long, global = true, env = "KITCHEN_INSTANCE")]
    pub instance: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Launch the instance on Marathon
    Create,

    /// Run converge commands on the instance
    Converge,

    /// Run setup commands on the instance
    Setup,

    /// Run verify commands on the instance
    Verify,

    /// Delete the instance from Marathon
    Destroy,

    /// Open an SSH session on the instance
    Login,

    /// Destroy, create, converge, setup, verify, then destroy again
    Test(commands::test::TestArgs),

    /// Show recorded instance state
    Show(JsonArgs),

    /// Show version
    Version(JsonArgs),
}

/// `--json` for the commands that print a document.
#[derive(Args)]
pub struct JsonArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be resolved or the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            quiet,
            no_color,
            config,
            instance,
            command,
        } = self;

        if let Command::Version(args) = &command {
            commands::version::run(args.json);
            return Ok(());
        }

        let ctx = AppContext::new(AppFlags {
            output: OutputFlags { no_color, quiet },
            config,
            instance,
        })?;

        match command {
            Command::Create => commands::lifecycle::run(&ctx, Action::Create).await,
            Command::Converge => commands::lifecycle::run(&ctx, Action::Converge).await,
            Command::Setup => commands::lifecycle::run(&ctx, Action::Setup).await,
            Command::Verify => commands::lifecycle::run(&ctx, Action::Verify).await,
            Command::Destroy => commands::lifecycle::run(&ctx, Action::Destroy).await,
            Command::Login => commands::lifecycle::run(&ctx, Action::Login).await,
            Command::Test(args) => commands::test::run(&ctx, &args).await,
            Command::Show(args) => commands::show::run(&ctx, args.json),
            Command::Version(_) => Ok(()),
        }
    }
}
