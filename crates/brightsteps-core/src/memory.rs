//! In-memory screening store.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::report::ScreeningRecord;
use crate::traits::ScreeningStore;

/// A `ScreeningStore` that keeps records in a vector.
///
/// Used by tests and by the CLI when no history directory is given. Writes
/// can be made to fail with `set_failing` to exercise the retry path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ScreeningRecord>>,
    /// Number of `save_screening` calls, including failed ones.
    save_calls: AtomicU32,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Get the number of save calls made to this store.
    pub fn save_calls(&self) -> u32 {
        self.save_calls.load(Ordering::Relaxed)
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ScreeningStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save_screening(&self, record: &ScreeningRecord) -> anyhow::Result<()> {
        self.save_calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.load(Ordering::Relaxed) {
            anyhow::bail!("store unavailable");
        }

        self.records
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?
            .push(record.clone());
        Ok(())
    }

    async fn screenings_for(&self, child_id: &str) -> anyhow::Result<Vec<ScreeningRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        let mut matching: Vec<ScreeningRecord> = records
            .iter()
            .filter(|r| r.child_id == child_id)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.created_at);
        Ok(matching)
    }
}
