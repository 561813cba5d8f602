//! Filesystem probe adapters: direct local checks and SSH-backed remote
//! checks over a session scoped to one verification run.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::application::ports::{FileProbe, RemoteFileSystem};
use crate::command_runner::{CommandRunner, TokioCommandRunner};
use crate::domain::cluster::Node;
use crate::domain::error::ProbeError;

// ── Local probe ───────────────────────────────────────────────────────────────

/// Direct filesystem existence check for local nodes.
pub struct LocalFileProbe;

impl FileProbe for LocalFileProbe {
    async fn exists(&self, path: &Path) -> Result<bool, ProbeError> {
        Ok(tokio::fs::try_exists(path).await?)
    }
}

// ── SSH probe ─────────────────────────────────────────────────────────────────

/// Remote filesystem access that drives the `ssh` binary through a
/// [`CommandRunner`]. Each verification run gets its own ControlMaster
/// session with a control socket in a private temp directory; probes
/// multiplex over it and `disconnect` tears it down.
pub struct SshRemoteFs<R: CommandRunner + Clone> {
    runner: R,
}

impl<R: CommandRunner + Clone> SshRemoteFs<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl Default for SshRemoteFs<TokioCommandRunner> {
    fn default() -> Self {
        Self::new(TokioCommandRunner::default())
    }
}

/// One live SSH session. Holding the [`TempDir`] keeps the control
/// socket's directory alive for the lifetime of the session.
#[derive(Debug)]
pub struct SshSession<R: CommandRunner> {
    runner: R,
    dest: String,
    port: Option<u16>,
    identity: Option<PathBuf>,
    control: TempDir,
}

impl<R: CommandRunner> SshSession<R> {
    fn control_path(&self) -> String {
        self.control.path().join("ctl.sock").to_string_lossy().into_owned()
    }

    /// Options shared by every call on this session.
    fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
            "-o".to_string(),
            format!("ControlPath={}", self.control_path()),
        ];
        if let Some(port) = self.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(identity) = &self.identity {
            args.push("-i".to_string());
            args.push(identity.to_string_lossy().into_owned());
        }
        args
    }

    async fn run_ssh(&self, extra: &[String]) -> Result<std::process::Output, ProbeError> {
        let mut args = self.base_args();
        args.extend_from_slice(extra);
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run("ssh", &refs)
            .await
            .map_err(|err| ProbeError::Transport(err.to_string()))
    }
}

impl<R: CommandRunner> FileProbe for SshSession<R> {
    async fn exists(&self, path: &Path) -> Result<bool, ProbeError> {
        let extra = vec![
            self.dest.clone(),
            "test".to_string(),
            "-e".to_string(),
            path.to_string_lossy().into_owned(),
        ];
        let output = self.run_ssh(&extra).await?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            // 255 is ssh's own failure code (connection lost, auth, ...).
            code => Err(ProbeError::Transport(format!(
                "ssh probe to {} failed (exit {:?}): {}",
                self.dest,
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

impl<R: CommandRunner + Clone> RemoteFileSystem for SshRemoteFs<R> {
    type Session = SshSession<R>;

    async fn connect(&self, node: &Node) -> Result<Self::Session, ProbeError> {
        let access = node.ssh.clone().unwrap_or_default();
        let dest = match &access.user {
            Some(user) => format!("{user}@{}", node.host),
            None => node.host.clone(),
        };
        let control = tempfile::Builder::new()
            .prefix("corral-ssh-")
            .tempdir()?;

        let session = SshSession {
            runner: self.runner.clone(),
            dest,
            port: access.port,
            identity: access.identity,
            control,
        };

        // Open the master connection; later probes multiplex over it.
        let extra = vec![
            "-o".to_string(),
            "ControlMaster=yes".to_string(),
            "-o".to_string(),
            "ControlPersist=yes".to_string(),
            session.dest.clone(),
            "true".to_string(),
        ];
        let output = session.run_ssh(&extra).await?;
        if !output.status.success() {
            return Err(ProbeError::Transport(format!(
                "cannot open ssh session to {}: {}",
                session.dest,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(session)
    }

    async fn disconnect(&self, session: Self::Session) {
        // Best effort; the socket directory disappears with the TempDir.
        let extra = vec![
            "-O".to_string(),
            "exit".to_string(),
            session.dest.clone(),
        ];
        let _ = session.run_ssh(&extra).await;
    }
}
