//! Shutdown-run domain types: poll budgets, per-channel verdicts, and the
//! aggregated outcome of one stop-and-verify run.

use std::time::Duration;

/// A bounded polling budget: how many attempts, and how long between them.
///
/// Attempt counters are monotonically increasing and bounded; budget
/// exhaustion is a terminal timeout, never an infinite loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollBudget {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollBudget {
    #[must_use]
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Worst-case wall-clock time this budget can spend.
    #[must_use]
    pub fn worst_case(&self) -> Duration {
        // max_attempts checks with a sleep between consecutive checks.
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

/// Liveness polling: 240 attempts x 500 ms, about 120 s.
pub const LIVENESS_BUDGET: PollBudget = PollBudget::new(240, Duration::from_millis(500));

/// Pid-file polling: 24 attempts x 5 s, about 120 s. The longer interval
/// keeps remote probes cheap.
pub const ARTIFACT_BUDGET: PollBudget = PollBudget::new(24, Duration::from_secs(5));

/// The two poll budgets of one stop-and-verify run.
#[derive(Debug, Clone, Copy)]
pub struct Budgets {
    pub liveness: PollBudget,
    pub artifact: PollBudget,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            liveness: LIVENESS_BUDGET,
            artifact: ARTIFACT_BUDGET,
        }
    }
}

// ── Per-channel verdicts ──────────────────────────────────────────────────────

/// Result of polling the instance's self-reported running state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessVerdict {
    /// A query reported not-running. A single observation suffices.
    Stopped,
    /// Every query within the budget reported still-running.
    TimedOut,
    /// The external cancellation signal fired during a sleep.
    Cancelled,
}

/// Result of verifying that the pid marker file disappeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactVerdict {
    /// The marker file is absent.
    Confirmed,
    /// The marker file was still present when the budget ran out.
    TimedOut,
    /// The probe itself failed such that absence could not be
    /// established. Distinct from a confirmed still-present observation.
    Inconclusive { reason: String },
    /// The external cancellation signal fired during a sleep.
    Cancelled,
}

// ── Aggregated outcome ────────────────────────────────────────────────────────

/// Reason code attached to a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Unresolvable instance, host, or port. Terminal, never retried.
    Configuration,
    /// The stop directive could not be delivered.
    Transport,
    /// The liveness budget ran out with the instance still reporting
    /// running.
    Timeout,
    /// The instance reports stopped but its pid file is still present.
    ArtifactStillPresent,
    /// The instance reports stopped but pid-file removal could not be
    /// confirmed (probe transport failure).
    CouldNotVerify,
    /// The run was cancelled from outside during a poll sleep.
    Cancelled,
}

impl FailureReason {
    /// Stable lowercase token used in JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::ArtifactStillPresent => "artifact-still-present",
            Self::CouldNotVerify => "could-not-verify",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The single aggregated result of one stop-and-verify run.
///
/// Finalized exactly once: either an earlier stage short-circuited with a
/// failure, or every applicable stage completed. Never mutated after
/// being returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        instance: String,
    },
    Failed {
        reason: FailureReason,
        message: String,
    },
}

impl Outcome {
    #[must_use]
    pub fn failed(reason: FailureReason, message: impl Into<String>) -> Self {
        Self::Failed {
            reason,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// One stop-and-verify request: the target instance and the force flag
/// forwarded to the instance's stop endpoint. The directive is sent at
/// most once per run; there is no retry count.
#[derive(Debug, Clone)]
pub struct ShutdownRequest {
    pub instance: String,
    pub force: bool,
}
