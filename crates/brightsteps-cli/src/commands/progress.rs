//! The `brightsteps progress` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use brightsteps_core::config::load_config_from;
use brightsteps_core::model::{Goal, LogEvent};
use brightsteps_core::progress::{compute_goal_progress_batch, GoalProgress};

pub fn execute(
    goals_path: PathBuf,
    events_path: PathBuf,
    now: Option<String>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let now = super::resolve_now(now.as_deref(), &config)?;

    let goals: Vec<Goal> = super::read_json(&goals_path)?;
    let events: Vec<LogEvent> = super::read_json(&events_path)?;

    let progress = compute_goal_progress_batch(&goals, &events, &now);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&progress)?);
        return Ok(());
    }

    if progress.is_empty() {
        println!("No goals.");
        return Ok(());
    }

    print_table(&goals, &progress);

    for warning in progress.iter().flat_map(|p| &p.warnings) {
        eprintln!("WARNING: {warning}");
    }

    Ok(())
}

fn print_table(goals: &[Goal], progress: &[GoalProgress]) {
    let mut table = Table::new();
    table.set_header(vec!["Goal", "Period", "Window start", "Done", "Progress"]);

    for (goal, p) in goals.iter().zip(progress) {
        let name = if goal.title.is_empty() {
            &goal.id
        } else {
            &goal.title
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(p.window.period),
            Cell::new(p.window.start.format("%Y-%m-%d %H:%M")),
            Cell::new(format!("{}/{}", p.count, p.target)),
            Cell::new(format!("{:.0}%", p.ratio * 100.0)),
        ]);
    }

    println!("{table}");
}
