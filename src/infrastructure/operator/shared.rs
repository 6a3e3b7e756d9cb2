//! Shared helper routines for operator implementations.

use tracing::error;

use crate::error::{Error, Result};
use crate::infrastructure::config::profile::Profile;
use crate::infrastructure::config::settings::Config;

pub(super) fn map_app_result(
    result: std::result::Result<Result<()>, tokio::task::JoinError>,
) -> Result<()> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => {
            error!(error = %error, "Control plane exited with error");
            Err(error)
        }
        Err(error) => {
            error!(error = %error, "Control plane task join failed");
            Err(Error::Io(std::io::Error::other(error)))
        }
    }
}

/// `owner/name@branch` for the configured remote repository.
pub(super) fn remote_label(config: &Config) -> Option<String> {
    config
        .github
        .as_ref()
        .map(|github| format!("{}@{}", github.repo, github.branch))
}

pub(super) fn addressing_label(config: &Config) -> String {
    let containers = &config.containers;
    match containers.profile {
        Profile::Host => format!(
            "host ports {}-{}",
            containers.port_range_start, containers.port_range_end
        ),
        Profile::Overlay => {
            format!("network {}", containers.network)
        }
    }
}
