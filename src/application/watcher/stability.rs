//! Stabilization guard for artifacts that may still be written.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::error::{Error, Result};

/// Timing of the stabilization wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizationConfig {
    /// Delay between size measurements.
    pub check_interval: Duration,
    /// How long the size must stay unchanged.
    pub stable_window: Duration,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_millis(500),
            stable_window: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Size of a file, or the aggregate size of every file under a directory.
pub fn artifact_size(path: &Path) -> io::Result<u64> {
    let metadata = std::fs::symlink_metadata(path)?;
    if !metadata.is_dir() {
        return Ok(metadata.len());
    }
    let mut total = 0;
    for entry in std::fs::read_dir(path)? {
        total += artifact_size(&entry?.path())?;
    }
    Ok(total)
}

async fn measure(path: &Path) -> Result<u64> {
    let owned: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || artifact_size(&owned))
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
        .map_err(Error::from)
}

/// Wait until the artifact's size stays unchanged for the stable window.
///
/// Returns `Ok(false)` if the timeout elapses first. A path that vanishes
/// while waiting is an I/O error.
pub async fn wait_until_stable(path: &Path, config: &StabilizationConfig) -> Result<bool> {
    let started = Instant::now();
    let mut last_size = measure(path).await?;
    let mut stable_since = Instant::now();

    loop {
        tokio::time::sleep(config.check_interval).await;
        let size = measure(path).await?;
        let now = Instant::now();

        if size != last_size {
            debug!(path = %path.display(), size, "Artifact still changing");
            last_size = size;
            stable_since = now;
        } else if now.duration_since(stable_since) >= config.stable_window {
            return Ok(true);
        }

        if now.duration_since(started) >= config.timeout {
            return Ok(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fast() -> StabilizationConfig {
        StabilizationConfig {
            check_interval: Duration::from_millis(10),
            stable_window: Duration::from_millis(30),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn directory_size_is_aggregate() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("1/variables")).unwrap();
        std::fs::write(dir.path().join("1/saved_model.pb"), [0u8; 10]).unwrap();
        std::fs::write(dir.path().join("1/variables/data"), [0u8; 5]).unwrap();

        assert_eq!(artifact_size(dir.path()).unwrap(), 15);
    }

    #[tokio::test]
    async fn unchanged_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fire.h5");
        std::fs::write(&path, b"weights").unwrap();

        assert!(wait_until_stable(&path, &fast()).await.unwrap());
    }

    #[tokio::test]
    async fn growing_file_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fire.h5");
        std::fs::write(&path, b"").unwrap();

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            for _ in 0..40 {
                let mut file = std::fs::OpenOptions::new()
                    .append(true)
                    .open(&writer_path)
                    .unwrap();
                file.write_all(b"x").unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let config = StabilizationConfig {
            check_interval: Duration::from_millis(10),
            stable_window: Duration::from_millis(100),
            timeout: Duration::from_millis(120),
        };
        assert!(!wait_until_stable(&path, &config).await.unwrap());
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(wait_until_stable(&dir.path().join("nope"), &fast())
            .await
            .is_err());
    }
}
