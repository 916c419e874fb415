//! TOML instrument and reward catalog parser.
//!
//! Loads screening instruments and reward catalogs from TOML files and
//! directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::instrument::{Instrument, RiskBands};
use crate::model::{Question, QuestionNumber, RewardCatalog, QUESTION_COUNT};
use crate::rewards::PredicateRegistry;

/// Intermediate TOML structure for parsing instrument files.
#[derive(Debug, Deserialize)]
struct TomlInstrumentFile {
    instrument: TomlInstrumentHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlInstrumentHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    bands: RiskBands,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    number: u8,
    text: String,
    #[serde(default)]
    examples: Vec<String>,
    #[serde(default)]
    critical: bool,
    /// "yes" or "no".
    #[serde(default = "default_risk_answer")]
    risk_answer: String,
}

fn default_risk_answer() -> String {
    "no".to_string()
}

fn parse_yes_no(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => anyhow::bail!("risk_answer must be \"yes\" or \"no\", got \"{other}\""),
    }
}

/// Parse a single TOML file into an `Instrument`.
pub fn parse_instrument(path: &Path) -> Result<Instrument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read instrument file: {}", path.display()))?;

    parse_instrument_str(&content, path)
}

/// Parse a TOML string into an `Instrument` (useful for testing).
pub fn parse_instrument_str(content: &str, source_path: &Path) -> Result<Instrument> {
    let parsed: TomlInstrumentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut questions = parsed
        .questions
        .into_iter()
        .map(|q| -> Result<Question> {
            let number = QuestionNumber::new(q.number)?;
            let risk_answer = parse_yes_no(&q.risk_answer)
                .with_context(|| format!("question {}", q.number))?;

            Ok(Question {
                number,
                text: q.text,
                examples: q.examples,
                critical: q.critical,
                risk_answer,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    questions.sort_by_key(|q| q.number);

    Ok(Instrument {
        id: parsed.instrument.id,
        name: parsed.instrument.name,
        description: parsed.instrument.description,
        questions,
        bands: parsed.instrument.bands,
    })
}

/// Recursively load all `.toml` instrument files from a directory.
pub fn load_instrument_directory(dir: &Path) -> Result<Vec<Instrument>> {
    let mut instruments = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            instruments.extend(load_instrument_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_instrument(&path) {
                Ok(instrument) => instruments.push(instrument),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    instruments.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(instruments)
}

/// Parse a reward catalog TOML file.
pub fn parse_rewards(path: &Path) -> Result<RewardCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rewards file: {}", path.display()))?;

    parse_rewards_str(&content, path)
}

/// Parse a reward catalog from a TOML string.
pub fn parse_rewards_str(content: &str, source_path: &Path) -> Result<RewardCatalog> {
    toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))
}

/// A warning from instrument or catalog validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question number or badge id (if applicable).
    pub item: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an instrument for common issues.
pub fn validate_instrument(instrument: &Instrument) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if instrument.questions.len() != QUESTION_COUNT {
        warnings.push(ValidationWarning {
            item: None,
            message: format!(
                "expected {QUESTION_COUNT} questions, found {}",
                instrument.questions.len()
            ),
        });
    }

    // Check for duplicate and missing question numbers
    let mut seen = HashSet::new();
    for q in &instrument.questions {
        if !seen.insert(q.number) {
            warnings.push(ValidationWarning {
                item: Some(q.number.to_string()),
                message: format!("duplicate question number: {}", q.number),
            });
        }
    }
    for n in QuestionNumber::all().filter(|n| !seen.contains(n)) {
        warnings.push(ValidationWarning {
            item: Some(n.to_string()),
            message: "question is missing".into(),
        });
    }

    for q in &instrument.questions {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                item: Some(q.number.to_string()),
                message: "question text is empty".into(),
            });
        }
    }

    let critical = instrument.questions.iter().filter(|q| q.critical).count();
    if critical != 6 {
        warnings.push(ValidationWarning {
            item: None,
            message: format!("expected 6 critical items, found {critical}"),
        });
    }

    let bands = &instrument.bands;
    if bands.medium_at >= bands.high_at {
        warnings.push(ValidationWarning {
            item: None,
            message: format!(
                "medium_at ({}) should be below high_at ({})",
                bands.medium_at, bands.high_at
            ),
        });
    }
    if usize::from(bands.high_at) > QUESTION_COUNT {
        warnings.push(ValidationWarning {
            item: None,
            message: format!("high_at ({}) can never be reached", bands.high_at),
        });
    }

    warnings
}

/// Validate a reward catalog against the predicates that will evaluate it.
pub fn validate_rewards(
    catalog: &RewardCatalog,
    registry: &PredicateRegistry,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for pair in catalog.milestones.windows(2) {
        if pair[0].stars_required >= pair[1].stars_required {
            warnings.push(ValidationWarning {
                item: Some(pair[1].label.clone()),
                message: format!(
                    "milestones must be strictly ascending: {} then {}",
                    pair[0].stars_required, pair[1].stars_required
                ),
            });
        }
    }

    let mut seen_ids = HashSet::new();
    for badge in &catalog.badges {
        if !seen_ids.insert(&badge.id) {
            warnings.push(ValidationWarning {
                item: Some(badge.id.clone()),
                message: format!("duplicate badge ID: {}", badge.id),
            });
        }
        if !registry.contains(&badge.predicate) {
            warnings.push(ValidationWarning {
                item: Some(badge.id.clone()),
                message: format!("unknown predicate: {}", badge.predicate),
            });
        }
    }

    warnings
}
