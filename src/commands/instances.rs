//! `corral instances` — list instances in the cluster topology.

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::InstanceDirectory;
use crate::infra::topology::ClusterTopology;

/// Run `corral instances`.
///
/// # Errors
///
/// Returns an error when the topology cannot be loaded.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let ctx = &app.output;
    let topology = ClusterTopology::load(&app.cluster_path)
        .with_context(|| format!("loading cluster topology {}", app.cluster_path.display()))?;

    let names = topology.names().await;

    if app.is_json() {
        let mut entries = Vec::with_capacity(names.len());
        for name in &names {
            if let Ok(member) = topology.resolve(name).await {
                entries.push(serde_json::json!({
                    "instance": member.instance.name,
                    "node": member.node.name,
                    "endpoint": member
                        .instance
                        .admin_endpoint()
                        .map(|e| e.to_string())
                        .ok(),
                }));
            }
        }
        println!("{}", serde_json::Value::Array(entries));
        return Ok(ExitCode::SUCCESS);
    }

    if names.is_empty() {
        ctx.info("No instances in the cluster topology.");
        return Ok(ExitCode::SUCCESS);
    }

    for name in &names {
        if let Ok(member) = topology.resolve(name).await {
            let endpoint = member
                .instance
                .admin_endpoint()
                .map_or_else(|_| "-".to_string(), |e| e.to_string());
            ctx.kv(
                &format!("{:<24}", member.instance.name),
                &format!("node {}  admin {endpoint}", member.node.name),
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
