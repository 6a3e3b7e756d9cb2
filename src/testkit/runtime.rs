//! In-process model runtime that records what it loaded and released.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::domain::{LoadedModel, ModelHandle, ModelInfo};
use crate::error::{ModelError, Result};
use crate::port::outbound::runtime::ModelRuntime;

pub const FAKE_FORMAT: &str = "fake";

/// Accepts every existing path whose file name is not rejected.
#[derive(Default)]
pub struct FakeRuntime {
    rejected: Mutex<BTreeSet<String>>,
    failing: Mutex<BTreeSet<String>>,
    delay: Mutex<Option<Duration>>,
    loads: AtomicUsize,
    released: Mutex<Vec<PathBuf>>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report artifacts named `name` as an unsupported format.
    pub fn reject(&self, name: &str) {
        self.rejected.lock().insert(name.to_string());
    }

    /// Fail loading artifacts named `name`.
    pub fn fail(&self, name: &str) {
        self.failing.lock().insert(name.to_string());
    }

    /// Sleep for `delay` inside every load.
    pub fn slow(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> Vec<PathBuf> {
        self.released.lock().clone()
    }
}

#[async_trait]
impl ModelRuntime for FakeRuntime {
    async fn detect(&self, _name: &str, path: &Path) -> Result<Option<LoadedModel>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let name = file_name(path);
        if self.failing.lock().contains(&name) {
            return Err(ModelError::LoadFailed {
                name,
                reason: "corrupt weights".into(),
            }
            .into());
        }
        if self.rejected.lock().contains(&name) || !path.exists() {
            return Ok(None);
        }

        Ok(Some(LoadedModel {
            info: ModelInfo::new(FAKE_FORMAT).with_detail("file", name.clone()),
            handle: ModelHandle::InProcess(Arc::new(name)),
        }))
    }

    async fn predict(&self, path: &Path, _handle: &ModelHandle, input: Value) -> Result<Value> {
        Ok(json!({ "model": file_name(path), "input": input }))
    }

    async fn release(&self, path: &Path, _handle: &ModelHandle) -> Result<()> {
        self.released.lock().push(path.to_path_buf());
        Ok(())
    }
}
