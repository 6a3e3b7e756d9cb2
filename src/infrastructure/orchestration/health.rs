//! Local readiness reporting.

use std::path::Path;

use crate::application::container::endpoint::is_port_free;
use crate::infrastructure::config::profile::Profile;
use crate::infrastructure::config::settings::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy(String),
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    name: &'static str,
    critical: bool,
    status: HealthStatus,
}

impl HealthCheck {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn critical(&self) -> bool {
        self.critical
    }

    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn checks(&self) -> &[HealthCheck] {
        &self.checks
    }

    pub fn is_healthy(&self) -> bool {
        self.checks
            .iter()
            .filter(|check| check.critical())
            .all(HealthCheck::is_healthy)
    }
}

fn status_from(result: std::result::Result<(), String>) -> HealthStatus {
    match result {
        Ok(()) => HealthStatus::Healthy,
        Err(reason) => HealthStatus::Unhealthy(reason),
    }
}

fn check_models_dir(dir: &Path) -> std::result::Result<(), String> {
    if dir.is_dir() {
        Ok(())
    } else if dir.exists() {
        Err(format!("{} is not a directory", dir.display()))
    } else {
        Err(format!("{} does not exist", dir.display()))
    }
}

/// The nearest existing ancestor of the state file must be a directory.
fn check_state_file(path: &Path) -> std::result::Result<(), String> {
    if path.is_dir() {
        return Err(format!("{} is a directory", path.display()));
    }
    let mut ancestor = path.parent();
    while let Some(dir) = ancestor {
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }
        if dir.exists() {
            return Err(format!("{} is not a directory", dir.display()));
        }
        ancestor = dir.parent();
    }
    Ok(())
}

fn check_containers(config: &Config) -> std::result::Result<(), String> {
    let containers = &config.containers;
    match containers.profile {
        Profile::Host => {
            let (start, end) = (containers.port_range_start, containers.port_range_end);
            if (start..=end).any(is_port_free) {
                Ok(())
            } else {
                Err(format!("no free host port in {start}-{end}"))
            }
        }
        Profile::Overlay => {
            if containers.network.trim().is_empty() {
                Err("overlay network is empty".to_string())
            } else {
                Ok(())
            }
        }
    }
}

fn check_github(config: &Config) -> std::result::Result<(), String> {
    let Some(github) = &config.github else {
        return Ok(());
    };
    if !github.repo_is_well_formed() {
        return Err(format!("repo '{}' is not owner/name", github.repo));
    }
    if github.token.is_none() {
        return Err("GITHUB_TOKEN not set, anonymous rate limits apply".to_string());
    }
    Ok(())
}

fn check_harbor(config: &Config) -> std::result::Result<(), String> {
    let Some(harbor) = &config.harbor else {
        return Ok(());
    };
    if harbor.username.is_none() {
        return Err(format!(
            "HARBOR_USERNAME not set, only public repositories of '{}' are listed",
            harbor.project
        ));
    }
    Ok(())
}

pub fn health_check(config: &Config) -> HealthReport {
    let checks = vec![
        HealthCheck {
            name: "models_dir",
            critical: true,
            status: status_from(check_models_dir(&config.models_dir)),
        },
        HealthCheck {
            name: "state_file",
            critical: true,
            status: status_from(check_state_file(&config.state_file)),
        },
        HealthCheck {
            name: "containers",
            critical: true,
            status: status_from(check_containers(config)),
        },
        HealthCheck {
            name: "github",
            critical: false,
            status: status_from(check_github(config)),
        },
        HealthCheck {
            name: "harbor",
            critical: false,
            status: status_from(check_harbor(config)),
        },
    ];

    HealthReport { checks }
}
