//! `corral status` — show an instance's reported state.
//!
//! One resolution plus one liveness query; no polling, no pid-file
//! probing. The reported state comes from the same (unreliable in
//! isolation) channel the stop command polls, which is good enough for a
//! status display.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{InstanceDirectory, StatusQuery};
use crate::infra::admin::HttpAdminChannel;
use crate::infra::topology::ClusterTopology;

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Instance to query
    pub instance: String,
}

/// Run `corral status`.
///
/// # Errors
///
/// Returns an error when the topology cannot be loaded or the instance
/// is not in it.
pub async fn run(app: &AppContext, args: &StatusArgs) -> Result<ExitCode> {
    let ctx = &app.output;
    let topology = ClusterTopology::load(&app.cluster_path)
        .with_context(|| format!("loading cluster topology {}", app.cluster_path.display()))?;

    let member = topology
        .resolve(&args.instance)
        .await
        .map_err(anyhow::Error::from)?;

    let (endpoint_display, state) = match member.instance.admin_endpoint() {
        Ok(endpoint) => {
            let running = HttpAdminChannel::new().is_running(&endpoint).await;
            (
                endpoint.to_string(),
                if running { "running" } else { "stopped" },
            )
        }
        // Without an endpoint there is nothing to query.
        Err(_) => ("-".to_string(), "unknown"),
    };

    if app.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "instance": member.instance.name,
                "node": member.node.name,
                "endpoint": endpoint_display,
                "state": state,
            })
        );
    } else {
        ctx.header(&member.instance.name);
        ctx.kv("node    ", &member.node.name);
        ctx.kv("endpoint", &endpoint_display);
        ctx.kv("state   ", state);
    }

    Ok(ExitCode::SUCCESS)
}
