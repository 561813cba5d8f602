//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to
//! `anyhow::Error` via the `?` operator.

use thiserror::Error;

// ── Directory errors ──────────────────────────────────────────────────────────

/// Errors from instance-name resolution.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("no instance named '{0}' in the cluster topology")]
    NotFound(String),
}

// ── Endpoint errors ───────────────────────────────────────────────────────────

/// Errors from validating an instance's administrative endpoint.
#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("instance '{0}' has no admin host configured")]
    MissingHost(String),

    #[error("instance '{0}' has no admin port configured")]
    MissingPort(String),
}

// ── Transport errors ──────────────────────────────────────────────────────────

/// Errors from the remote admin command channel.
///
/// Surfaced verbatim to the orchestrator; the channel itself never retries.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot reach {host}:{port}: {detail}")]
    Unreachable {
        host: String,
        port: u16,
        detail: String,
    },

    #[error("admin endpoint {host}:{port} rejected the request: HTTP {status}")]
    Rejected {
        host: String,
        port: u16,
        status: u16,
    },
}

// ── Probe errors ──────────────────────────────────────────────────────────────

/// Errors from a filesystem existence probe.
///
/// A probe error means the probe itself failed, as opposed to succeeding
/// and reporting the undesired state. The artifact verifier maps a
/// trailing probe error to an `Inconclusive` verdict, never to success.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe transport failed: {0}")]
    Transport(String),

    #[error("probe I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

// ── Instance name errors ──────────────────────────────────────────────────────

/// Errors from instance-name validation.
#[derive(Debug, Error)]
pub enum NameError {
    #[error("invalid instance name '{0}': must match ^[a-z0-9]([a-z0-9-]{{0,61}}[a-z0-9])?$")]
    Invalid(String),
}
