//! Per-model-name async locks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes long-running operations on the same model name while letting
/// different names proceed concurrently.
///
/// Guards are held across I/O (container start, artifact download), which is
/// why this is separate from the registry lock. A name's entry lives only
/// while some caller holds or awaits its lock.
#[derive(Default)]
pub struct NameLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Exclusive access to one name; releases and evicts its entry on drop.
pub struct NameGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    name: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for NameGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold a clone, so a count of one means nobody else wants it.
        self.locks
            .remove_if(&self.name, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl NameLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `name`.
    pub async fn acquire(&self, name: &str) -> NameGuard<'_> {
        let lock = self
            .locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;
        NameGuard {
            locks: &self.locks,
            name: name.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of names currently held or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
