//! The `brightsteps validate` command.

use std::path::PathBuf;

use anyhow::Result;

use brightsteps_core::instrument::Instrument;
use brightsteps_core::parser::{self, ValidationWarning};
use brightsteps_core::rewards::PredicateRegistry;
use brightsteps_core::RewardCatalog;

pub fn execute(instrument_path: Option<PathBuf>, rewards_path: Option<PathBuf>) -> Result<()> {
    let mut total_warnings = 0;

    let instruments = match &instrument_path {
        Some(path) if path.is_dir() => parser::load_instrument_directory(path)?,
        Some(path) => vec![parser::parse_instrument(path)?],
        None if rewards_path.is_none() => vec![Instrument::mchat_r()],
        None => Vec::new(),
    };

    for instrument in &instruments {
        println!(
            "Instrument: {} ({} questions)",
            instrument.name,
            instrument.questions.len()
        );
        let warnings = parser::validate_instrument(instrument);
        print_warnings(&warnings);
        total_warnings += warnings.len();
    }

    let catalog = match &rewards_path {
        Some(path) => Some(parser::parse_rewards(path)?),
        None if instrument_path.is_none() => Some(RewardCatalog::standard()),
        None => None,
    };

    if let Some(catalog) = &catalog {
        println!(
            "Rewards: {} milestones, {} badges",
            catalog.milestones.len(),
            catalog.badges.len()
        );
        let warnings = parser::validate_rewards(catalog, &PredicateRegistry::builtin());
        print_warnings(&warnings);
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All files valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn print_warnings(warnings: &[ValidationWarning]) {
    for w in warnings {
        let prefix = w
            .item
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
}
