pub mod init;
pub mod progress;
pub mod rewards;
pub mod screen;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::de::DeserializeOwned;

use brightsteps_core::config::BrightstepsConfig;

/// Read and deserialize a JSON input file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// `--now` if given, otherwise the current time in the configured zone.
pub(crate) fn resolve_now(now: Option<&str>, config: &BrightstepsConfig) -> Result<DateTime<FixedOffset>> {
    match now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("invalid --now timestamp: {s}")),
        None => Ok(Utc::now().with_timezone(&config.timezone()?)),
    }
}
