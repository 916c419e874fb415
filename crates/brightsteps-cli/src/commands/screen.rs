//! The `brightsteps screen` command.

use std::path::PathBuf;

use anyhow::Result;

use brightsteps_core::config::load_config_from;
use brightsteps_core::error::{ScreeningError, SubmitError};
use brightsteps_core::memory::MemoryStore;
use brightsteps_core::parser::parse_instrument;
use brightsteps_core::questionnaire::{AnswerSet, QuestionnaireSession};
use brightsteps_core::report::ScreeningRecord;
use brightsteps_core::scoring::ScoringEngine;
use brightsteps_core::traits::{submit_screening, ScreeningStore};

use crate::store::DirectoryStore;

pub async fn execute(
    answers_path: PathBuf,
    instrument_path: Option<PathBuf>,
    child_id: String,
    save: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let instrument = match instrument_path {
        Some(path) => parse_instrument(&path)?,
        None => config.load_instrument()?,
    };
    let engine = ScoringEngine::new(instrument)?;

    let answers: AnswerSet = super::read_json(&answers_path)?;
    let session = QuestionnaireSession::resume(answers);

    let store: Box<dyn ScreeningStore> = match save {
        Some(dir) => Box::new(DirectoryStore::new(dir)),
        None => Box::new(MemoryStore::new()),
    };

    let record = match submit_screening(&session, &engine, store.as_ref(), &child_id).await {
        Ok(record) => record,
        Err(SubmitError::Screening(e @ ScreeningError::Incomplete { .. })) => {
            let missing: Vec<String> = session.unanswered().iter().map(|n| n.to_string()).collect();
            anyhow::bail!("{e}; missing: {}", missing.join(", "));
        }
        Err(e) => return Err(e.into()),
    };

    let history = store.screenings_for(&child_id).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&record)?),
        "markdown" | "md" => println!("{}", record.to_markdown(&engine)),
        _ => print_text(&record, &engine, history.len()),
    }

    Ok(())
}

fn print_text(record: &ScreeningRecord, engine: &ScoringEngine, history_len: usize) {
    let result = &record.result;
    println!("Instrument: {}", engine.instrument().name);
    println!("Child: {}", record.child_id);
    println!("Score: {}/20", result.total_score);
    println!("Risk: {}", result.risk_level.display_text());
    println!("Critical items failed: {}", result.critical_fail_count);
    if result.follow_up_needed {
        println!("Follow-up recommended.");
    }
    if history_len > 1 {
        println!("Screenings on file: {history_len}");
    }
}
