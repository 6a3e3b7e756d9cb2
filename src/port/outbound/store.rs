//! Persistence port for container records.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::ContainerRecord;
use crate::error::Result;

/// Whole-document store mapping model name to its container record.
///
/// Implementations rewrite the full document on every save; there are no
/// partial updates.
#[async_trait]
pub trait ContainerRecordStore: Send + Sync {
    /// Load the document. A missing document is an empty map.
    async fn load(&self) -> Result<BTreeMap<String, ContainerRecord>>;

    /// Replace the document.
    async fn save(&self, records: &BTreeMap<String, ContainerRecord>) -> Result<()>;
}
