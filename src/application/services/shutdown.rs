//! Shutdown orchestrator — the stop-and-verify use-case.
//!
//! Sequences instance resolution, the stop directive, the liveness poll,
//! and the pid-file verification into one run with strict early-exit
//! semantics, and produces exactly one aggregated [`Outcome`].

use tokio_util::sync::CancellationToken;

use crate::application::services::{artifact, liveness};

use crate::application::ports::{
    Clock, FileProbe, InstanceDirectory, ProgressReporter, RemoteFileSystem, StatusQuery,
    StopChannel,
};
use crate::domain::cluster::{self, validate_instance_name};
use crate::domain::shutdown::{
    ArtifactVerdict, Budgets, FailureReason, LivenessVerdict, Outcome, ShutdownRequest,
};

/// Run one stop-and-verify sequence against the named instance.
///
/// The run executes as a single logical sequence of awaited operations on
/// the calling task; the two poll channels run strictly in order because
/// pid-file confirmation is only meaningful once liveness evidence
/// exists. Worst-case blocking time is the sum of both poll budgets plus
/// one command round-trip — callers wanting non-blocking behaviour spawn
/// the whole run on a task they can wait on.
///
/// Stage sequencing, each failure short-circuiting all later stages:
///
/// 1. Validate and resolve the instance name; a missing instance, admin
///    host, or admin port fails with a configuration error.
/// 2. Query reported state once. An instance that already reports
///    stopped skips the directive and the liveness poll entirely — stop
///    requests are only sent to instances believed to be running.
/// 3. Send the stop directive, at most once per run.
/// 4. Poll liveness. A timeout here is treated as sufficient evidence of
///    failure and the pid-file budget is not spent (see DESIGN.md for the
///    reasoning behind this early exit).
/// 5. Verify the pid file is gone. Only this stage confirming absence
///    yields success.
///
/// Two concurrent runs against the same instance are not coordinated;
/// each observes state independently.
#[allow(clippy::too_many_arguments)] // every collaborator is an injected port
pub async fn stop_and_verify<R: RemoteFileSystem>(
    request: &ShutdownRequest,
    directory: &impl InstanceDirectory,
    channel: &impl StopChannel,
    status: &impl StatusQuery,
    local_probe: &impl FileProbe,
    remote_fs: &R,
    clock: &impl Clock,
    cancel: &CancellationToken,
    reporter: &impl ProgressReporter,
    budgets: Budgets,
) -> Outcome {
    let name = &request.instance;

    // Stage 1: resolve.
    if let Err(err) = validate_instance_name(name) {
        return Outcome::failed(FailureReason::Configuration, err.to_string());
    }
    let member = match directory.resolve(name).await {
        Ok(member) => member,
        Err(err) => return Outcome::failed(FailureReason::Configuration, err.to_string()),
    };
    let endpoint = match member.instance.admin_endpoint() {
        Ok(endpoint) => endpoint,
        Err(err) => return Outcome::failed(FailureReason::Configuration, err.to_string()),
    };

    // Stage 2: one status query decides whether a directive is sent at all.
    if status.is_running(&endpoint).await {
        reporter.step(&format!("sending stop directive to '{name}' at {endpoint}"));
        if let Err(err) = channel.request_stop(&endpoint, request.force).await {
            return Outcome::failed(
                FailureReason::Transport,
                format!("stop directive for '{name}' failed: {err}"),
            );
        }

        // Stage 3: wait for the instance to report stopped.
        reporter.step(&format!("waiting for '{name}' to report stopped"));
        match liveness::await_stopped(&endpoint, budgets.liveness, status, clock, cancel).await {
            LivenessVerdict::Stopped => {}
            LivenessVerdict::TimedOut => {
                return Outcome::failed(
                    FailureReason::Timeout,
                    format!(
                        "'{name}' still reports running after {} status queries (~{}s)",
                        budgets.liveness.max_attempts,
                        budgets.liveness.worst_case().as_secs()
                    ),
                );
            }
            LivenessVerdict::Cancelled => {
                return Outcome::failed(
                    FailureReason::Cancelled,
                    format!("stop of '{name}' cancelled while waiting for reported shutdown"),
                );
            }
        }
    } else {
        reporter.step(&format!("'{name}' already reports stopped"));
    }

    // Stage 4: independent pid-file confirmation.
    reporter.step(&format!("confirming '{name}' released its pid file"));
    let marker = cluster::pid_file(&member.node, &member.instance.name);
    match artifact::confirm_absent(
        &member.node,
        &marker,
        budgets.artifact,
        local_probe,
        remote_fs,
        clock,
        cancel,
    )
    .await
    {
        ArtifactVerdict::Confirmed => {
            reporter.success(&format!("'{name}' stopped"));
            Outcome::Success {
                instance: name.clone(),
            }
        }
        ArtifactVerdict::TimedOut => Outcome::failed(
            FailureReason::ArtifactStillPresent,
            format!(
                "'{name}' reports stopped but its pid file {} is still present",
                marker.display()
            ),
        ),
        ArtifactVerdict::Inconclusive { reason } => Outcome::failed(
            FailureReason::CouldNotVerify,
            format!("'{name}' reports stopped but pid-file removal could not be confirmed: {reason}"),
        ),
        ArtifactVerdict::Cancelled => Outcome::failed(
            FailureReason::Cancelled,
            format!("stop of '{name}' cancelled while confirming pid-file removal"),
        ),
    }
}
