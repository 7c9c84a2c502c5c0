use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::record::{Candidates, ProductRecord, RecordId};
use crate::ProductStore;

/// In-memory product store. Records keep insertion order, which stands in
/// for the natural order of a collection scan.
#[derive(Default)]
pub struct MemoryProductStore {
    records: RwLock<Vec<ProductRecord>>,
    // Names whose writes fail, for exercising per-item error handling
    rejected_names: HashSet<String>,
    // Documents matching the candidate query that cannot be decoded
    unreadable: Vec<String>,
    writes: AtomicUsize,
    closed: AtomicBool,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ProductRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Makes every `set_cross_ref` on a record with this name fail.
    pub fn reject_writes_for(mut self, name: impl Into<String>) -> Self {
        self.rejected_names.insert(name.into());
        self
    }

    /// Adds an unlinked document that fails to decode, described by `reason`.
    pub fn with_unreadable(mut self, reason: impl Into<String>) -> Self {
        self.unreadable.push(reason.into());
        self
    }

    pub async fn get(&self, id: &RecordId) -> Option<ProductRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|record| &record.id == id)
            .cloned()
    }

    /// Number of successful writes since creation.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_missing_cross_ref(&self) -> StoreResult<Candidates> {
        let records = self
            .records
            .read()
            .await
            .iter()
            .filter(|record| !record.is_linked())
            .cloned()
            .collect();
        let unreadable = self
            .unreadable
            .iter()
            .map(|reason| StoreError::InvalidRecord(reason.clone()))
            .collect();
        Ok(Candidates {
            records,
            unreadable,
        })
    }

    async fn set_cross_ref(&self, id: &RecordId, value: &str) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        if self.rejected_names.contains(&record.name) {
            return Err(StoreError::WriteRejected {
                id: id.clone(),
                reason: "write rejected by store".to_string(),
            });
        }

        record.cross_ref = Some(value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
