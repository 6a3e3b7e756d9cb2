//! Foreground control-plane lifecycle.

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::application::watcher::FilesystemWatcher;
use crate::domain::SweepReport;
use crate::error::Result;
use crate::infrastructure::bootstrap::Components;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::control::ModelControlPort;

/// Build the production components and serve until `shutdown` flips.
pub async fn run_with_shutdown(
    config: Config,
    activate: Vec<String>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let components = Components::build(config)?;
    serve(&components, &activate, shutdown).await
}

/// Discover models, activate the requested ones, watch the models directory
/// in the background, and sweep owned containers on shutdown.
pub async fn serve(
    components: &Components,
    activate: &[String],
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let config = &components.config;
    info!(
        models_dir = %config.models_dir.display(),
        profile = %config.containers.profile,
        image = %config.containers.image,
        "Starting modelplane"
    );

    let watcher = components.watcher();
    discover(components, &watcher).await;

    for name in activate {
        match components.control.activate(name).await {
            Ok(response) => {
                info!(model = %name, endpoint = %response.predict_endpoint, "{}", response.message);
            }
            Err(e) => warn!(model = %name, error = %e, "Requested activation failed"),
        }
    }

    let watcher_handle = if config.watcher.enabled {
        Some(watcher.start())
    } else {
        info!("Filesystem watcher disabled");
        None
    };

    info!(
        available = components.registry.available_models().len(),
        active = components.registry.active_models().len(),
        "Control plane ready"
    );

    wait_for_shutdown(&mut shutdown).await;
    info!("Shutdown signal received");

    if let Some(handle) = watcher_handle {
        handle.shutdown().await;
    }

    teardown(components).await.map(|_| ())
}

/// Deactivate everything and force-remove every owned container.
pub async fn teardown(components: &Components) -> Result<SweepReport> {
    let deactivated = components.lifecycle.deactivate_all().await;
    let report = match components.orchestrator.sweep_owned().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Owned-container sweep failed");
            return Err(e);
        }
    };

    for (container, reason) in &report.failed {
        warn!(container = %container, reason = %reason, "Failed to remove owned container");
    }
    info!(
        deactivated,
        removed = report.removed.len(),
        failed = report.failed.len(),
        "Owned containers swept"
    );
    Ok(report)
}

/// Register local artifacts, then entries of each remote source not shadowed
/// by a local one or an earlier source.
async fn discover(components: &Components, watcher: &FilesystemWatcher) {
    match watcher.poll_once().await {
        Ok(outcome) => info!(models = outcome.added.len(), "Local models discovered"),
        Err(e) => warn!(
            dir = %watcher.dir().display(),
            error = %e,
            "Initial scan of models directory failed"
        ),
    }

    for source in components.remote_sources() {
        let kind = source.kind();
        match source.list().await {
            Ok(models) => {
                let mut added = 0usize;
                for (name, descriptor) in models {
                    if components.registry.is_available(name.as_str()) {
                        continue;
                    }
                    components.sync.added(descriptor);
                    added += 1;
                }
                info!(source = %kind, models = added, "Remote models discovered");
            }
            Err(e) => warn!(source = %kind, error = %e, "Remote model listing failed"),
        }
    }
}

/// Resolves once the flag is set or every sender is gone.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            break;
        }
    }
}
