//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Cluster instance administration
#[derive(Parser)]
#[command(
    name = "corral",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Skip interactive prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Cluster topology file (default: ~/.corral/cluster.yaml)
    #[arg(long, global = true, value_name = "PATH", env = "CORRAL_CLUSTER")]
    pub cluster: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stop an instance and verify it terminated
    Stop(commands::stop::StopArgs),

    /// Show an instance's reported state
    Status(commands::status::StatusArgs),

    /// List instances in the cluster topology
    Instances,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails before producing an outcome.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            cluster,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
            cluster,
        });

        // Ctrl-C aborts in-flight poll sleeps with a Cancelled outcome
        // instead of killing the process mid-report.
        let cancel = app.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        match command {
            Command::Stop(args) => commands::stop::run(&app, &args).await,
            Command::Status(args) => commands::status::run(&app, &args).await,
            Command::Instances => commands::instances::run(&app).await,
            Command::Version => Ok(commands::version::run(app.is_json())),
        }
    }
}
