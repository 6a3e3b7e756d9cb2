//! Staged placement of downloaded models.
//!
//! Remote sources write into a hidden `.<name>.partial` path first so the
//! directory watcher never sees a half-written model, then swap it into place.

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// Hidden staging path for `name` under `models_dir`.
#[must_use]
pub fn staging_path(models_dir: &Path, name: &str) -> PathBuf {
    models_dir.join(format!(".{name}.partial"))
}

/// Fill a staging path with `fill`, then move it to `models_dir/<name>`.
///
/// A failed fill leaves neither the staging path nor a partial target behind.
pub async fn stage<F, Fut>(models_dir: &Path, name: &str, fill: F) -> Result<PathBuf>
where
    F: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let target = models_dir.join(name);
    let staging = staging_path(models_dir, name);

    tokio::fs::create_dir_all(models_dir).await?;
    remove_if_exists(&staging).await?;

    if let Err(e) = fill(staging.clone()).await {
        if let Err(cleanup) = remove_if_exists(&staging).await {
            warn!(path = %staging.display(), error = %cleanup, "Failed to clean staging path");
        }
        return Err(e);
    }

    remove_if_exists(&target).await?;
    tokio::fs::rename(&staging, &target).await?;
    Ok(target)
}

pub async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::symlink_metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(tokio::fs::remove_dir_all(path).await?),
        Ok(_) => Ok(tokio::fs::remove_file(path).await?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
