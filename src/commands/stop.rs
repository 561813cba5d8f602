//! `corral stop` — stop an instance and verify it actually terminated.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::shutdown;
use crate::command_runner::TokioCommandRunner;
use crate::domain::shutdown::{Budgets, Outcome, ShutdownRequest};
use crate::infra::admin::HttpAdminChannel;
use crate::infra::clock::TokioClock;
use crate::infra::probe::{LocalFileProbe, SshRemoteFs};
use crate::infra::topology::ClusterTopology;
use crate::output::reporter::TerminalReporter;

/// Arguments for the stop command.
#[derive(Args)]
pub struct StopArgs {
    /// Instance to stop
    pub instance: String,

    /// Ask the instance to exit immediately instead of draining work first
    #[arg(
        long,
        value_name = "BOOL",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub force: bool,
}

/// Run `corral stop`.
///
/// The orchestrator's outcome maps to the process exit code here: zero
/// only when the instance reported stopped and released its pid file.
///
/// # Errors
///
/// Returns an error when the topology cannot be loaded or the confirm
/// prompt fails; orchestration failures are reported as a non-zero exit
/// code, not an `Err`.
pub async fn run(app: &AppContext, args: &StopArgs) -> Result<ExitCode> {
    let ctx = &app.output;

    if !app.confirm(&format!("Stop instance '{}'?", args.instance), true)? {
        ctx.info("Aborted.");
        return Ok(ExitCode::SUCCESS);
    }

    let topology = ClusterTopology::load(&app.cluster_path)
        .with_context(|| format!("loading cluster topology {}", app.cluster_path.display()))?;

    let admin = HttpAdminChannel::new();
    let request = ShutdownRequest {
        instance: args.instance.clone(),
        force: args.force,
    };

    let outcome = shutdown::stop_and_verify(
        &request,
        &topology,
        &admin,
        &admin,
        &LocalFileProbe,
        &SshRemoteFs::new(TokioCommandRunner::default()),
        &TokioClock,
        &app.cancel,
        &TerminalReporter::new(ctx),
        Budgets::default(),
    )
    .await;

    if app.is_json() {
        let payload = match &outcome {
            Outcome::Success { instance } => serde_json::json!({
                "instance": instance,
                "outcome": "success",
            }),
            Outcome::Failed { reason, message } => serde_json::json!({
                "instance": args.instance,
                "outcome": "failure",
                "reason": reason.as_str(),
                "message": message,
            }),
        };
        println!("{payload}");
    } else if let Outcome::Failed { message, .. } = &outcome {
        ctx.error(message);
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
