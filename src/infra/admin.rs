//! HTTP admin endpoint adapter — stop directive and status query.
//!
//! Instances expose a small admin listener on their configured host and
//! port. The stop directive is `POST /admin/stop`; the reported running
//! state is `GET /admin/status`. Both calls use a blocking `ureq` agent
//! with short timeouts, run on the blocking pool.

use std::time::Duration;

use crate::application::ports::{StatusQuery, StopChannel};
use crate::domain::cluster::AdminEndpoint;
use crate::domain::error::TransportError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Admin channel speaking HTTP to an instance's admin listener.
#[derive(Clone)]
pub struct HttpAdminChannel {
    agent: ureq::Agent,
}

impl HttpAdminChannel {
    #[must_use]
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout(CALL_TIMEOUT)
            .build();
        Self { agent }
    }
}

impl Default for HttpAdminChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl StopChannel for HttpAdminChannel {
    async fn request_stop(
        &self,
        endpoint: &AdminEndpoint,
        force: bool,
    ) -> Result<(), TransportError> {
        let agent = self.agent.clone();
        let host = endpoint.host.clone();
        let port = endpoint.port;
        let url = format!("http://{host}:{port}/admin/stop");

        let result = tokio::task::spawn_blocking(move || {
            agent
                .post(&url)
                .send_json(serde_json::json!({ "force": force }))
        })
        .await
        .map_err(|err| TransportError::Unreachable {
            host: endpoint.host.clone(),
            port,
            detail: format!("stop task failed: {err}"),
        })?;

        match result {
            // The instance acknowledged receipt; it exits on its own time.
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(TransportError::Rejected {
                host: endpoint.host.clone(),
                port,
                status,
            }),
            Err(err) => Err(TransportError::Unreachable {
                host: endpoint.host.clone(),
                port,
                detail: err.to_string(),
            }),
        }
    }
}

impl StatusQuery for HttpAdminChannel {
    /// One status query against the admin listener.
    ///
    /// Any HTTP response means a live listener answered, so the instance
    /// is reported running. A transport failure is reported not-running:
    /// an admin port that cannot accept a connection is the strongest
    /// not-running signal this channel can give. The pid-file check is
    /// the independent confirmation.
    async fn is_running(&self, endpoint: &AdminEndpoint) -> bool {
        let agent = self.agent.clone();
        let url = format!("http://{}:{}/admin/status", endpoint.host, endpoint.port);

        let result = tokio::task::spawn_blocking(move || agent.get(&url).call()).await;
        match result {
            Ok(Ok(_)) | Ok(Err(ureq::Error::Status(_, _))) => true,
            Ok(Err(_)) | Err(_) => false,
        }
    }
}
