//! In-memory container record store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::ContainerRecord;
use crate::error::{Error, Result};
use crate::port::outbound::store::ContainerRecordStore;

#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<BTreeMap<String, ContainerRecord>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ContainerRecord>) -> Self {
        let store = Self::new();
        store.records.lock().extend(
            records
                .into_iter()
                .map(|record| (record.model_name.clone(), record)),
        );
        store
    }

    /// Snapshot of what is currently persisted.
    pub fn snapshot(&self) -> BTreeMap<String, ContainerRecord> {
        self.records.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContainerRecordStore for MemoryRecordStore {
    async fn load(&self) -> Result<BTreeMap<String, ContainerRecord>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Error::Persistence("record document is corrupt".into()));
        }
        Ok(self.records.lock().clone())
    }

    async fn save(&self, records: &BTreeMap<String, ContainerRecord>) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Persistence("disk full".into()));
        }
        *self.records.lock() = records.clone();
        Ok(())
    }
}
