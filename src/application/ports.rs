//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`. Every collaborator of the
//! shutdown orchestrator is a port passed in explicitly, so each is
//! substitutable in tests.

use std::path::Path;
use std::time::Duration;

use crate::domain::cluster::{AdminEndpoint, ClusterMember, Node};
use crate::domain::error::{DirectoryError, ProbeError, TransportError};

// ── Instance directory ────────────────────────────────────────────────────────

/// Resolves an instance name to its admin endpoint and owning node.
#[allow(async_fn_in_trait)]
pub trait InstanceDirectory {
    /// Look up one instance.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] when the topology has no
    /// instance with this name.
    async fn resolve(&self, name: &str) -> Result<ClusterMember, DirectoryError>;

    /// All instance names known to the topology, in declaration order.
    async fn names(&self) -> Vec<String>;
}

// ── Remote command channel ────────────────────────────────────────────────────

/// Sends a single stop directive to a resolved admin endpoint.
///
/// The call is fire-and-forget with respect to completion: it returns as
/// soon as the remote side acknowledges receipt, and never waits for the
/// instance to actually exit. Exactly one network call per invocation;
/// the receiver treats the directive as idempotent. Transport failures
/// are surfaced verbatim — this channel does not retry.
#[allow(async_fn_in_trait)]
pub trait StopChannel {
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the directive could not be
    /// delivered or was rejected.
    async fn request_stop(
        &self,
        endpoint: &AdminEndpoint,
        force: bool,
    ) -> Result<(), TransportError>;
}

// ── Status query ──────────────────────────────────────────────────────────────

/// Queries an instance's self-reported running state.
///
/// This channel is knowingly unreliable in isolation: the status path may
/// run inside the dying process, so a stale answer can persist briefly
/// after actual exit. The artifact verifier exists as the independent
/// cross-check.
#[allow(async_fn_in_trait)]
pub trait StatusQuery {
    async fn is_running(&self, endpoint: &AdminEndpoint) -> bool;
}

// ── Filesystem probes ─────────────────────────────────────────────────────────

/// A filesystem existence probe — one interface, local and remote
/// implementations. Probes only read; the pid file's lifecycle belongs to
/// the instance process.
#[allow(async_fn_in_trait)]
pub trait FileProbe {
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when the probe itself failed — distinct
    /// from successfully observing the file as present.
    async fn exists(&self, path: &Path) -> Result<bool, ProbeError>;
}

/// Remote filesystem access over a session scoped to one verification
/// run. The session must be released on every exit path and never held
/// across orchestrator invocations.
#[allow(async_fn_in_trait)]
pub trait RemoteFileSystem {
    type Session: FileProbe;

    /// Open a probe session against the node.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when the node is unreachable.
    async fn connect(&self, node: &Node) -> Result<Self::Session, ProbeError>;

    /// Release the session. Infallible by contract; implementations log
    /// and swallow teardown failures.
    async fn disconnect(&self, session: Self::Session);
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Injectable timer so poll loops can be tested without real delays.
#[allow(async_fn_in_trait)]
pub trait Clock {
    async fn sleep(&self, duration: Duration);
}

// ── Progress reporting ────────────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
