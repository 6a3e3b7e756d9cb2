//! Handler for the `sweep` command.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{operator, output};
use crate::error::{ContainerError, Result};

/// Force-remove every owned serving container.
pub async fn execute(config: Option<&Path>) -> Result<()> {
    let config_toml = operator::read_config_toml(config)?;
    let summary = operator::operator()?.sweep_containers(&config_toml).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "sweep",
            "removed": summary.removed,
            "failed": summary
                .failed
                .iter()
                .map(|(name, reason)| json!({ "name": name, "reason": reason }))
                .collect::<Vec<_>>(),
        }));
    } else {
        output::section("Sweep");
        for name in &summary.removed {
            output::success(&format!("Removed {name}"));
        }
        for (name, reason) in &summary.failed {
            output::error(&format!("{name}: {reason}"));
        }
        if summary.removed.is_empty() && summary.failed.is_empty() {
            output::note("No owned containers");
        }
    }

    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(ContainerError::Engine(format!(
            "{} container(s) could not be removed",
            summary.failed.len()
        ))
        .into())
    }
}
