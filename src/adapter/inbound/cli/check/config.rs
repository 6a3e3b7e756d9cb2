use std::path::Path;

use crate::adapter::inbound::cli::{operator, output, paths};
use crate::error::Result;
use crate::port::inbound::operator::diagnostic::ConfigCheckReport;

/// Validate the configuration without starting the control plane.
pub fn execute_config(config_path: Option<&Path>) -> Result<()> {
    let config_toml = operator::read_config_toml(config_path)?;
    let report = operator::operator()?.check_config(&config_toml)?;

    if output::is_json() {
        output::json_output(serde_json::json!({
            "command": "check.config",
            "valid": true,
            "models_dir": report.models_dir,
            "state_file": report.state_file,
            "profile": report.profile,
            "image": report.serving_image,
            "remote_repo": report.remote_repo,
            "github_token_present": report.github_token_present,
            "watcher_enabled": report.watcher_enabled,
            "webhook_branch": report.webhook_branch,
        }));
        return Ok(());
    }

    output::section("Configuration Check");
    output::field("Config", config_label(config_path));
    output::success("Configuration is valid");

    output::section("Summary");
    output::field("Models", &report.models_dir);
    output::field("State file", &report.state_file);
    output::field("Profile", &report.profile);
    output::field("Image", &report.serving_image);
    output::field(
        "Watcher",
        if report.watcher_enabled { "enabled" } else { "disabled" },
    );

    output::field("Remote", remote_summary(&report));
    if report.remote_repo.is_some() {
        output::field(
            "Webhook",
            report.webhook_branch.as_deref().unwrap_or("any branch"),
        );
        if !report.github_token_present {
            output::warning("GITHUB_TOKEN not set, anonymous rate limits apply");
        }
    }

    output::success("Configuration check complete");
    Ok(())
}

fn config_label(config_path: Option<&Path>) -> String {
    match config_path {
        Some(path) => path.display().to_string(),
        None => {
            let default = paths::default_config();
            if default.is_file() {
                default.display().to_string()
            } else {
                "built-in defaults".to_string()
            }
        }
    }
}

fn remote_summary(report: &ConfigCheckReport) -> String {
    match (&report.remote_repo, report.github_token_present) {
        (Some(repo), true) => format!("{repo} (authenticated)"),
        (Some(repo), false) => format!("{repo} (anonymous)"),
        (None, _) => "disabled".to_string(),
    }
}
