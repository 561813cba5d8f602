//! Unit tests for the stop-and-verify orchestrator: stage sequencing,
//! strict early-exit, and the aggregated outcome.

#![allow(clippy::expect_used)]

use tokio_util::sync::CancellationToken;

use corral_cli::application::services::shutdown::stop_and_verify;
use corral_cli::domain::cluster::ClusterMember;
use corral_cli::domain::shutdown::{Budgets, FailureReason, Outcome, ShutdownRequest};

use crate::helpers::{
    CancelOnSleepClock, InstantClock, NullReporter, ProbeStep, RecordingChannel, ScriptedProbe,
    ScriptedStatus, StaticDirectory, StubRemoteFs, local_node, member_on, ssh_node,
};

fn request() -> ShutdownRequest {
    ShutdownRequest {
        instance: "worker-1".into(),
        force: true,
    }
}

/// One orchestrator run with instant sleeps and default budgets.
async fn run(
    member: ClusterMember,
    channel: &RecordingChannel,
    status: &ScriptedStatus,
    local: &ScriptedProbe,
    remote: &StubRemoteFs,
) -> Outcome {
    stop_and_verify(
        &request(),
        &StaticDirectory::with(member),
        channel,
        status,
        local,
        remote,
        &InstantClock::new(),
        &CancellationToken::new(),
        &NullReporter,
        Budgets::default(),
    )
    .await
}

fn reason_of(outcome: &Outcome) -> FailureReason {
    match outcome {
        Outcome::Failed { reason, .. } => *reason,
        Outcome::Success { .. } => panic!("expected failure, got {outcome:?}"),
    }
}

fn message_of(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Failed { message, .. } => message.clone(),
        Outcome::Success { .. } => panic!("expected failure, got {outcome:?}"),
    }
}

// ── Configuration stage ───────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_instance_is_a_configuration_failure() {
    let outcome = stop_and_verify(
        &request(),
        &StaticDirectory::empty(),
        &RecordingChannel::ok(),
        &ScriptedStatus::always_running(),
        &ScriptedProbe::always_present(),
        &StubRemoteFs::with_session(ScriptedProbe::always_present()),
        &InstantClock::new(),
        &CancellationToken::new(),
        &NullReporter,
        Budgets::default(),
    )
    .await;

    assert_eq!(reason_of(&outcome), FailureReason::Configuration);
    assert!(message_of(&outcome).contains("worker-1"));
}

#[tokio::test]
async fn invalid_instance_name_fails_before_resolution() {
    let req = ShutdownRequest {
        instance: "Worker_1".into(),
        force: true,
    };
    let outcome = stop_and_verify(
        &req,
        &StaticDirectory::empty(),
        &RecordingChannel::ok(),
        &ScriptedStatus::always_running(),
        &ScriptedProbe::always_present(),
        &StubRemoteFs::with_session(ScriptedProbe::always_present()),
        &InstantClock::new(),
        &CancellationToken::new(),
        &NullReporter,
        Budgets::default(),
    )
    .await;

    assert_eq!(reason_of(&outcome), FailureReason::Configuration);
    assert!(message_of(&outcome).contains("invalid instance name"));
}

#[tokio::test]
async fn missing_admin_host_short_circuits_everything() {
    let mut member = member_on(local_node());
    member.instance.admin_host = None;
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::always_running();
    let local = ScriptedProbe::always_present();
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member, &channel, &status, &local, &remote).await;

    assert_eq!(reason_of(&outcome), FailureReason::Configuration);
    assert_eq!(status.queries.get(), 0);
    assert_eq!(channel.calls.get(), 0);
    assert_eq!(local.count(), 0);
}

#[tokio::test]
async fn missing_admin_port_short_circuits_everything() {
    let mut member = member_on(local_node());
    member.instance.admin_port = None;
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::always_running();
    let local = ScriptedProbe::always_present();
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member, &channel, &status, &local, &remote).await;

    assert_eq!(reason_of(&outcome), FailureReason::Configuration);
    assert!(message_of(&outcome).contains("admin port"));
    assert_eq!(channel.calls.get(), 0);
}

// ── Directive stage ───────────────────────────────────────────────────────────

#[tokio::test]
async fn already_stopped_instance_never_receives_a_directive() {
    // Scenario C entry condition: the directive and the liveness poll are
    // skipped; only the artifact verifier runs.
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::already_stopped();
    let local = ScriptedProbe::new(
        &[ProbeStep::Present, ProbeStep::Present, ProbeStep::Absent],
        ProbeStep::Absent,
    );
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member_on(local_node()), &channel, &status, &local, &remote).await;

    assert!(outcome.is_success(), "got {outcome:?}");
    assert_eq!(channel.calls.get(), 0, "no stop request for a stopped instance");
    assert_eq!(status.queries.get(), 1, "only the entry check queries status");
    assert_eq!(local.count(), 3, "pid file released within budget");
}

#[tokio::test]
async fn transport_error_prevents_both_pollers() {
    let channel = RecordingChannel::failing();
    let status = ScriptedStatus::always_running();
    let local = ScriptedProbe::always_present();
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member_on(ssh_node()), &channel, &status, &local, &remote).await;

    assert_eq!(reason_of(&outcome), FailureReason::Transport);
    assert_eq!(channel.calls.get(), 1, "the directive is sent exactly once");
    assert_eq!(status.queries.get(), 1, "no liveness polling after transport failure");
    assert_eq!(local.count(), 0);
    assert_eq!(remote.connects.get(), 0, "no artifact verification either");
}

#[tokio::test]
async fn force_flag_is_forwarded_to_the_channel() {
    let req = ShutdownRequest {
        instance: "worker-1".into(),
        force: false,
    };
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::new(&[true, false], false);
    let local = ScriptedProbe::new(&[ProbeStep::Absent], ProbeStep::Absent);
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = stop_and_verify(
        &req,
        &StaticDirectory::with(member_on(local_node())),
        &channel,
        &status,
        &local,
        &remote,
        &InstantClock::new(),
        &CancellationToken::new(),
        &NullReporter,
        Budgets::default(),
    )
    .await;

    assert!(outcome.is_success());
    assert_eq!(*channel.forces.borrow(), vec![false]);
}

// ── Liveness stage ────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_three_queries_then_success() {
    // isRunning: true, true, false — stopped after exactly 3 queries
    // (the entry check plus two poll attempts), then the pid file is
    // already absent.
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::new(&[true, true, false], false);
    let local = ScriptedProbe::new(&[ProbeStep::Absent], ProbeStep::Absent);
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member_on(local_node()), &channel, &status, &local, &remote).await;

    assert!(outcome.is_success(), "got {outcome:?}");
    assert_eq!(channel.calls.get(), 1);
    assert_eq!(status.queries.get(), 3);
}

#[tokio::test]
async fn scenario_b_liveness_timeout_never_probes_the_artifact() {
    // isRunning stays true for the whole 240-attempt budget: the second
    // budget is not spent.
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::always_running();
    let local = ScriptedProbe::always_present();
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member_on(local_node()), &channel, &status, &local, &remote).await;

    assert_eq!(reason_of(&outcome), FailureReason::Timeout);
    // Entry check + 240 poll attempts.
    assert_eq!(status.queries.get(), 241);
    assert_eq!(local.count(), 0, "zero probe invocations after liveness timeout");
    assert_eq!(remote.connects.get(), 0);
}

#[tokio::test]
async fn cancellation_during_liveness_reports_cancelled() {
    let token = CancellationToken::new();
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::always_running();
    let local = ScriptedProbe::always_present();
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = stop_and_verify(
        &request(),
        &StaticDirectory::with(member_on(local_node())),
        &channel,
        &status,
        &local,
        &remote,
        &CancelOnSleepClock {
            token: token.clone(),
        },
        &token,
        &NullReporter,
        Budgets::default(),
    )
    .await;

    assert_eq!(reason_of(&outcome), FailureReason::Cancelled);
    assert_eq!(local.count(), 0, "no artifact verification after cancellation");
}

// ── Artifact stage ────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_c_stopped_instance_with_lingering_pid_file() {
    // Already stopped at entry, marker present, removed within budget.
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::already_stopped();
    let local = ScriptedProbe::new(
        &[ProbeStep::Present, ProbeStep::Absent],
        ProbeStep::Absent,
    );
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member_on(local_node()), &channel, &status, &local, &remote).await;

    assert!(outcome.is_success(), "got {outcome:?}");
    assert_eq!(channel.calls.get(), 0);
}

#[tokio::test]
async fn scenario_d_remote_probe_failures_are_could_not_verify() {
    // REMOTE node, probe transport failing throughout the budget.
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::new(&[true, false], false);
    let local = ScriptedProbe::always_present();
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_failing());

    let outcome = run(member_on(ssh_node()), &channel, &status, &local, &remote).await;

    assert_eq!(reason_of(&outcome), FailureReason::CouldNotVerify);
    let message = message_of(&outcome);
    assert!(
        message.contains("could not be confirmed"),
        "message distinguishes inconclusive verification: {message}"
    );
    assert_eq!(remote.disconnects.get(), 1, "session released on the error path");
    assert_eq!(local.count(), 0, "never both probes in one run");
}

#[tokio::test]
async fn lingering_pid_file_fails_with_a_distinct_message() {
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::new(&[true, false], false);
    let local = ScriptedProbe::always_present();
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member_on(local_node()), &channel, &status, &local, &remote).await;

    assert_eq!(reason_of(&outcome), FailureReason::ArtifactStillPresent);
    let still_present = message_of(&outcome);
    assert!(still_present.contains("still present"), "got: {still_present}");

    // Same failure point, inconclusive channel: the two messages differ.
    let remote_failing = StubRemoteFs::with_session(ScriptedProbe::always_failing());
    let inconclusive = run(
        member_on(ssh_node()),
        &RecordingChannel::ok(),
        &ScriptedStatus::new(&[true, false], false),
        &ScriptedProbe::always_present(),
        &remote_failing,
    )
    .await;
    assert_ne!(still_present, message_of(&inconclusive));
}

#[tokio::test]
async fn success_requires_both_channels_to_agree() {
    // Liveness confirms stopped but the artifact check times out: no
    // success without the second channel.
    let channel = RecordingChannel::ok();
    let status = ScriptedStatus::new(&[true, false], false);
    let local = ScriptedProbe::always_present();
    let remote = StubRemoteFs::with_session(ScriptedProbe::always_present());

    let outcome = run(member_on(local_node()), &channel, &status, &local, &remote).await;

    assert!(!outcome.is_success());
    // And the dual: both confirming yields success.
    let outcome = run(
        member_on(local_node()),
        &RecordingChannel::ok(),
        &ScriptedStatus::new(&[true, false], false),
        &ScriptedProbe::new(&[ProbeStep::Absent], ProbeStep::Absent),
        &StubRemoteFs::with_session(ScriptedProbe::always_present()),
    )
    .await;
    assert!(outcome.is_success());
}
