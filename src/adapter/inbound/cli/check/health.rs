use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{operator, output};
use crate::error::{ConfigError, Result};
use crate::port::inbound::operator::diagnostic::HealthCheckEntry;

/// Run local readiness checks using configuration.
pub fn execute_health(config_path: Option<&Path>) -> Result<()> {
    let config_toml = operator::read_config_toml(config_path)?;
    let report = operator::operator()?.health_report(&config_toml)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "check.health",
            "status": if report.is_healthy() { "healthy" } else { "unhealthy" },
            "checks": report.checks.iter().map(check_json).collect::<Vec<_>>(),
        }));
    } else {
        output::section("Health Check");
        for check in &report.checks {
            output::field(&check_label(check), status_text(check));
        }
    }

    if !report.is_healthy() {
        output::error("Health check failed");
        return Err(ConfigError::Other("health check failed".into()).into());
    }
    if !output::is_quiet() {
        output::success("Health check passed");
    }
    Ok(())
}

fn check_label(check: &HealthCheckEntry) -> String {
    if check.critical {
        format!("{} (critical)", check.name)
    } else {
        check.name.clone()
    }
}

fn status_text(check: &HealthCheckEntry) -> String {
    match &check.failure {
        None => output::positive("healthy"),
        Some(reason) if check.critical => output::negative(format!("unhealthy: {reason}")),
        Some(reason) => format!("unhealthy: {reason}"),
    }
}

fn check_json(check: &HealthCheckEntry) -> serde_json::Value {
    json!({
        "name": check.name,
        "critical": check.critical,
        "status": if check.is_healthy() { "healthy" } else { "unhealthy" },
        "details": check.failure,
    })
}
