//! The `brightsteps rewards` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use brightsteps_core::config::load_config_from;
use brightsteps_core::model::{Goal, LogEvent};
use brightsteps_core::parser::parse_rewards;
use brightsteps_core::report::load_history;
use brightsteps_core::rewards::{next_milestone, BadgeLedger, ChildState, PredicateRegistry};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    events_path: PathBuf,
    goals_path: Option<PathBuf>,
    rewards_path: Option<PathBuf>,
    ledger_path: Option<PathBuf>,
    history_dir: Option<PathBuf>,
    child: String,
    now: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let now = super::resolve_now(now.as_deref(), &config)?;

    let catalog = match rewards_path {
        Some(path) => parse_rewards(&path)?,
        None => config.load_rewards()?,
    };

    let events: Vec<LogEvent> = super::read_json(&events_path)?;
    let goals: Vec<Goal> = match goals_path {
        Some(path) => super::read_json(&path)?,
        None => Vec::new(),
    };
    let screenings = match history_dir {
        Some(dir) => load_history(&dir)?
            .iter()
            .filter(|r| r.child_id == child)
            .count() as u32,
        None => 0,
    };

    let state = ChildState::derive(&goals, &events, &now).with_screenings(screenings);

    println!("Stars: {}", state.total_stars);
    let milestone = next_milestone(state.total_stars, &catalog.milestones);
    match &milestone.next {
        Some(next) => println!(
            "Next milestone: {} ({} more, {:.0}%)",
            next.label,
            milestone.remaining,
            milestone.progress * 100.0
        ),
        None => println!("All milestones reached!"),
    }

    let ledger_path = ledger_path.or(config.ledger);
    let mut ledger = match &ledger_path {
        Some(path) => BadgeLedger::load_json_or_default(path)?,
        None => BadgeLedger::new(),
    };

    let registry = PredicateRegistry::builtin();
    let unlocked = ledger.evaluate(&catalog.badges, &registry, &state, now.with_timezone(&Utc));

    if unlocked.is_empty() {
        println!("No new badges.");
    } else {
        for badge in &unlocked {
            let name = catalog
                .badges
                .iter()
                .find(|b| b.id == badge.badge_id)
                .map(|b| b.name.as_str())
                .unwrap_or(badge.badge_id.as_str());
            println!("Unlocked: {name} [{}]", badge.tier);
        }
    }
    println!("Badges: {}/{}", ledger.len(), catalog.badges.len());

    if let Some(path) = &ledger_path {
        ledger.save_json(path)?;
    }

    Ok(())
}
