//! Liveness poller — waits for an instance to report not-running.

use tokio_util::sync::CancellationToken;

use crate::application::ports::{Clock, StatusQuery};
use crate::domain::cluster::AdminEndpoint;
use crate::domain::shutdown::{LivenessVerdict, PollBudget};

/// Poll the instance's reported running state until it reports stopped or
/// the budget runs out.
///
/// Returns [`LivenessVerdict::Stopped`] as soon as a single query reports
/// not-running; consecutive confirmations are not required. Performs at
/// most `budget.max_attempts` queries. The inter-attempt sleep is raced
/// against `cancel`, so an external cancellation aborts the loop promptly
/// with a verdict distinguishable from a timeout.
pub async fn await_stopped(
    endpoint: &AdminEndpoint,
    budget: PollBudget,
    status: &impl StatusQuery,
    clock: &impl Clock,
    cancel: &CancellationToken,
) -> LivenessVerdict {
    for attempt in 1..=budget.max_attempts {
        if !status.is_running(endpoint).await {
            return LivenessVerdict::Stopped;
        }
        if attempt == budget.max_attempts {
            break;
        }
        tokio::select! {
            () = cancel.cancelled() => return LivenessVerdict::Cancelled,
            () = clock.sleep(budget.interval) => {}
        }
    }
    LivenessVerdict::TimedOut
}
