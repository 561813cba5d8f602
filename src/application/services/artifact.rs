//! Artifact verifier — confirms that an instance's pid marker file has
//! disappeared, through a probe strategy chosen by node locality.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{Clock, FileProbe, RemoteFileSystem};
use crate::domain::cluster::{Node, NodeKind};
use crate::domain::error::ProbeError;
use crate::domain::shutdown::{ArtifactVerdict, PollBudget};

/// Verify that `marker` is absent on `node`, polling at the artifact
/// cadence until absent or the budget runs out.
///
/// Strategy selection is a pure function of `node.kind`: local nodes use
/// the direct filesystem probe, SSH nodes open a remote session scoped to
/// this run. Exactly one strategy runs per invocation, and a remote
/// session is released on every exit path — confirmed, timed out,
/// inconclusive, or cancelled.
pub async fn confirm_absent<R: RemoteFileSystem>(
    node: &Node,
    marker: &Path,
    budget: PollBudget,
    local: &impl FileProbe,
    remote: &R,
    clock: &impl Clock,
    cancel: &CancellationToken,
) -> ArtifactVerdict {
    match node.kind {
        NodeKind::Local => poll_absent(local, marker, budget, clock, cancel).await,
        NodeKind::Ssh => {
            let session = match remote.connect(node).await {
                Ok(session) => session,
                Err(err) => {
                    return ArtifactVerdict::Inconclusive {
                        reason: format!("cannot open probe session to node '{}': {err}", node.name),
                    };
                }
            };
            let verdict = poll_absent(&session, marker, budget, clock, cancel).await;
            remote.disconnect(session).await;
            verdict
        }
    }
}

/// Poll one probe until the file is absent or the budget runs out.
///
/// On exhaustion the verdict follows the most recent attempt: a trailing
/// probe failure means absence could not be established (`Inconclusive`),
/// while a trailing successful "present" observation means the file is
/// really still there (`TimedOut`).
async fn poll_absent(
    probe: &impl FileProbe,
    marker: &Path,
    budget: PollBudget,
    clock: &impl Clock,
    cancel: &CancellationToken,
) -> ArtifactVerdict {
    let mut last_error: Option<ProbeError> = None;

    for attempt in 1..=budget.max_attempts {
        match probe.exists(marker).await {
            Ok(false) => return ArtifactVerdict::Confirmed,
            Ok(true) => last_error = None,
            Err(err) => last_error = Some(err),
        }
        if attempt == budget.max_attempts {
            break;
        }
        tokio::select! {
            () = cancel.cancelled() => return ArtifactVerdict::Cancelled,
            () = clock.sleep(budget.interval) => {}
        }
    }

    match last_error {
        Some(err) => ArtifactVerdict::Inconclusive {
            reason: err.to_string(),
        },
        None => ArtifactVerdict::TimedOut,
    }
}
