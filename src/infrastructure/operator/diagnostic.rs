//! Diagnostic operator implementation.

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::{health_check, HealthStatus};
use crate::port::inbound::operator::diagnostic::{
    ConfigCheckReport, DiagnosticOperator, HealthCheckEntry, HealthCheckReport,
};

use super::{entry::Operator, shared};

impl DiagnosticOperator for Operator {
    fn check_config(&self, config_toml: &str) -> Result<ConfigCheckReport> {
        let config = Config::parse_toml(config_toml)?;

        Ok(ConfigCheckReport {
            models_dir: config.models_dir.display().to_string(),
            state_file: config.state_file.display().to_string(),
            profile: format!(
                "{} ({})",
                config.containers.profile,
                shared::addressing_label(&config)
            ),
            serving_image: config.containers.image.clone(),
            remote_repo: shared::remote_label(&config),
            github_token_present: config
                .github
                .as_ref()
                .is_some_and(|github| github.token.is_some()),
            watcher_enabled: config.watcher.enabled,
            webhook_branch: config.webhook.branch_filter(),
        })
    }

    fn health_report(&self, config_toml: &str) -> Result<HealthCheckReport> {
        let config = Config::parse_toml(config_toml)?;
        let report = health_check(&config);
        let checks = report
            .checks()
            .iter()
            .map(|check| HealthCheckEntry {
                name: check.name().to_string(),
                critical: check.critical(),
                failure: match check.status() {
                    HealthStatus::Healthy => None,
                    HealthStatus::Unhealthy(reason) => Some(reason.clone()),
                },
            })
            .collect();

        Ok(HealthCheckReport { checks })
    }
}
