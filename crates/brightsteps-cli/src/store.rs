//! Screening store backed by a directory of JSON records.

use std::path::PathBuf;

use async_trait::async_trait;

use brightsteps_core::report::{load_history, ScreeningRecord};
use brightsteps_core::traits::ScreeningStore;

/// Appends each record as its own JSON file; never overwrites.
pub struct DirectoryStore {
    dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl ScreeningStore for DirectoryStore {
    fn name(&self) -> &str {
        "directory"
    }

    async fn save_screening(&self, record: &ScreeningRecord) -> anyhow::Result<()> {
        let path = self.dir.join(record.file_name());
        if path.exists() {
            anyhow::bail!("record already exists: {}", path.display());
        }
        record.save_json(&path)
    }

    async fn screenings_for(&self, child_id: &str) -> anyhow::Result<Vec<ScreeningRecord>> {
        Ok(load_history(&self.dir)?
            .into_iter()
            .filter(|r| r.child_id == child_id)
            .collect())
    }
}
