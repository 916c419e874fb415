//! Persisted screening records with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ScreeningResult;
use crate::questionnaire::AnswerSet;
use crate::scoring::ScoringEngine;

/// A submitted screening, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// Child the screening was taken for.
    pub child_id: String,
    /// When the screening was submitted.
    pub created_at: DateTime<Utc>,
    /// Instrument the answers were scored against.
    pub instrument_id: String,
    pub answers: AnswerSet,
    pub result: ScreeningResult,
}

impl ScreeningRecord {
    pub fn new(
        child_id: impl Into<String>,
        instrument_id: impl Into<String>,
        answers: AnswerSet,
        result: ScreeningResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            child_id: child_id.into(),
            created_at: Utc::now(),
            instrument_id: instrument_id.into(),
            answers,
            result,
        }
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))?;
        let record: ScreeningRecord =
            serde_json::from_str(&content).context("failed to parse record JSON")?;
        Ok(record)
    }

    /// File name used when saving into a history directory.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            self.created_at.format("%Y%m%dT%H%M%SZ"),
            self.id.simple()
        )
    }

    /// Render the record as a markdown summary with a per-item table.
    pub fn to_markdown(&self, engine: &ScoringEngine) -> String {
        let mut md = String::new();
        let instrument = engine.instrument();

        md.push_str(&format!("## {} screening\n\n", instrument.name));
        md.push_str(&format!(
            "**Child:** {}  \n**Date:** {}\n\n",
            self.child_id,
            self.created_at.format("%Y-%m-%d %H:%M UTC")
        ));
        md.push_str(&format!(
            "**Score:** {}/20  \n**Risk:** {}  \n**Critical items failed:** {}\n\n",
            self.result.total_score,
            self.result.risk_level.display_text(),
            self.result.critical_fail_count
        ));
        if self.result.follow_up_needed {
            md.push_str("> Follow-up recommended.\n\n");
        }

        if let Ok(items) = engine.score_items(&self.answers) {
            md.push_str("| # | Question | Answer | Scored | Critical |\n");
            md.push_str("|---|----------|--------|--------|----------|\n");
            for item in items {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    item.number,
                    instrument
                        .question(item.number)
                        .map(|q| q.text.as_str())
                        .unwrap_or(""),
                    if item.answer { "yes" } else { "no" },
                    if item.scored { "x" } else { "" },
                    if item.critical { "x" } else { "" },
                ));
            }
        }

        md
    }
}

/// The current screening out of a history: the latest by `created_at`.
pub fn latest(records: &[ScreeningRecord]) -> Option<&ScreeningRecord> {
    records.iter().max_by_key(|r| r.created_at)
}

/// Load every `.json` record in a history directory, oldest first.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_history(dir: &Path) -> Result<Vec<ScreeningRecord>> {
    let mut records = Vec::new();
    if !dir.exists() {
        return Ok(records);
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            match ScreeningRecord::load_json(&path) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
            }
        }
    }

    records.sort_by_key(|r| r.created_at);
    Ok(records)
}
