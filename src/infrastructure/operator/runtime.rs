//! Runtime operator implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::orchestration::run_with_shutdown;
use crate::port::inbound::operator::runtime::{RunRequest, RunStartupSnapshot, RuntimeOperator};

use super::{entry::Operator, shared};

#[async_trait]
impl RuntimeOperator for Operator {
    fn prepare_run(&self, request: &RunRequest) -> Result<RunStartupSnapshot> {
        let config = Self::load_run_config(request)?;

        Ok(RunStartupSnapshot {
            models_dir: config.models_dir.display().to_string(),
            profile: config.containers.profile.to_string(),
            addressing: shared::addressing_label(&config),
            serving_image: config.containers.image.clone(),
            remote_repo: shared::remote_label(&config),
            watcher_enabled: config.watcher.enabled,
            activate: request.activate.clone(),
        })
    }

    async fn execute_run(&self, request: RunRequest) -> Result<()> {
        let config = Self::load_run_config(&request)?;
        config.init_logging();

        info!(
            models_dir = %config.models_dir.display(),
            activate = ?request.activate,
            "modelplane starting"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let activate = request.activate;
        let mut app_handle =
            tokio::spawn(async move { run_with_shutdown(config, activate, shutdown_rx).await });

        tokio::select! {
            result = &mut app_handle => {
                shared::map_app_result(result)?;
                info!("modelplane stopped");
                return Ok(());
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received (Ctrl+C)");
                let _ = shutdown_tx.send(true);
            }
        }

        shared::map_app_result(app_handle.await)?;
        info!("modelplane stopped");
        Ok(())
    }
}

impl Operator {
    fn load_run_config(request: &RunRequest) -> Result<Config> {
        let mut config = Config::parse_toml(&request.config_toml)?;
        Self::apply_run_overrides(&mut config, request);
        config.validate()?;
        Ok(config)
    }

    fn apply_run_overrides(config: &mut Config, request: &RunRequest) {
        if let Some(ref models_dir) = request.models_dir {
            config.models_dir = PathBuf::from(models_dir);
        }

        if let Some(ref log_level) = request.log_level {
            config.logging.level = log_level.clone();
        }

        if request.json_logs {
            config.logging.format = "json".to_string();
        }

        if request.no_watch {
            config.watcher.enabled = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_take_precedence_over_file() {
        let request = RunRequest {
            config_toml: "models_dir = \"/srv/models\"\n".into(),
            activate: vec!["fire".into()],
            models_dir: Some("/tmp/models".into()),
            log_level: Some("debug".into()),
            json_logs: true,
            no_watch: true,
        };

        let config = Operator::load_run_config(&request).unwrap();
        assert_eq!(config.models_dir, PathBuf::from("/tmp/models"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert!(!config.watcher.enabled);
    }

    #[test]
    fn startup_snapshot_describes_profile() {
        let request = RunRequest {
            config_toml: "[containers]\nprofile = \"overlay\"\nnetwork = \"serving\"\n".into(),
            activate: vec!["fire".into()],
            ..RunRequest::default()
        };

        let snapshot = Operator::new().prepare_run(&request).unwrap();
        assert_eq!(snapshot.profile, "overlay");
        assert_eq!(snapshot.addressing, "network serving");
        assert_eq!(snapshot.activate, vec!["fire".to_string()]);
        assert!(snapshot.remote_repo.is_none());
    }
}
