//! Milestones and badges.
//!
//! Both are driven by a child's cumulative star count but are separate
//! taxonomies: a milestone is the next star threshold on a fixed ladder,
//! while a badge is a named achievement that stays unlocked forever once
//! its predicate has held.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{total_stars, BadgeDefinition, BadgeTier, Goal, LogEvent, MilestoneThreshold};
use crate::progress::{compute_goal_progress_batch, current_streak};

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// Where a child stands on the milestone ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneProgress {
    /// First milestone not yet reached; `None` once every one is reached.
    pub next: Option<MilestoneThreshold>,
    /// Stars still needed for `next`. Never negative.
    pub remaining: u32,
    /// `total_stars / next.stars_required`, clamped to `[0, 1]`.
    pub progress: f64,
    /// Milestones already reached, in ladder order.
    pub achieved: Vec<MilestoneThreshold>,
}

/// Evaluate `total_stars` against an ascending threshold list.
pub fn next_milestone(total_stars: u32, thresholds: &[MilestoneThreshold]) -> MilestoneProgress {
    let achieved: Vec<MilestoneThreshold> = thresholds
        .iter()
        .filter(|t| t.stars_required <= total_stars)
        .cloned()
        .collect();

    let Some(next) = thresholds.iter().find(|t| t.stars_required > total_stars) else {
        return MilestoneProgress {
            next: None,
            remaining: 0,
            progress: 1.0,
            achieved,
        };
    };

    let remaining = next.stars_required.saturating_sub(total_stars);
    let progress = (f64::from(total_stars) / f64::from(next.stars_required)).min(1.0);

    MilestoneProgress {
        next: Some(next.clone()),
        remaining,
        progress,
        achieved,
    }
}

// ---------------------------------------------------------------------------
// Child state and badge predicates
// ---------------------------------------------------------------------------

/// Accumulated facts about a child that badge predicates look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildState {
    pub total_stars: u32,
    /// Goals whose target is met in their current window.
    pub goals_met: u32,
    pub current_streak_days: u32,
    pub events_logged: u32,
    pub screenings_completed: u32,
}

impl ChildState {
    /// Derive the state from a child's goals and log events at `now`.
    ///
    /// `screenings_completed` is not derivable from goal data and is left at
    /// zero; set it from the screening history.
    pub fn derive<Tz: TimeZone>(goals: &[Goal], events: &[LogEvent], now: &DateTime<Tz>) -> Self {
        let goals_met = compute_goal_progress_batch(goals, events, now)
            .iter()
            .filter(|p| p.is_met())
            .count() as u32;

        Self {
            total_stars: total_stars(events),
            goals_met,
            current_streak_days: current_streak(events, now),
            events_logged: events.len() as u32,
            screenings_completed: 0,
        }
    }

    pub fn with_screenings(mut self, completed: u32) -> Self {
        self.screenings_completed = completed;
        self
    }
}

type Predicate = Box<dyn Fn(&ChildState) -> bool + Send + Sync>;

/// Named badge predicates.
pub struct PredicateRegistry {
    predicates: HashMap<String, Predicate>,
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.predicates.keys().collect();
        names.sort();
        f.debug_struct("PredicateRegistry")
            .field("predicates", &names)
            .finish()
    }
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PredicateRegistry {
    /// A registry with no predicates.
    pub fn empty() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }

    /// The predicates referenced by the standard reward catalog.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register("first_star", |s| s.total_stars >= 1);
        for stars in [25u32, 50, 100, 250, 500] {
            registry.register(format!("stars_{stars}"), move |s| s.total_stars >= stars);
        }

        registry.register("goal_met_1", |s| s.goals_met >= 1);
        registry.register("goals_met_5", |s| s.goals_met >= 5);

        for days in [3u32, 7, 30] {
            registry.register(format!("streak_{days}"), move |s| s.current_streak_days >= days);
        }

        registry.register("first_screening", |s| s.screenings_completed >= 1);

        registry
    }

    /// Add or replace a predicate.
    pub fn register<F>(&mut self, name: impl Into<String>, predicate: F)
    where
        F: Fn(&ChildState) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Box::new(predicate));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Evaluate a predicate; `None` if the name is not registered.
    pub fn evaluate(&self, name: &str, state: &ChildState) -> Option<bool> {
        self.predicates.get(name).map(|p| p(state))
    }
}

// ---------------------------------------------------------------------------
// Badge ledger
// ---------------------------------------------------------------------------

/// A badge transition from locked to unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeUnlock {
    pub badge_id: String,
    pub tier: BadgeTier,
    pub unlocked_at: DateTime<Utc>,
}

/// The badges a child has unlocked, with the moment each was unlocked.
///
/// Entries are only ever added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeLedger {
    #[serde(default)]
    unlocked: BTreeMap<String, DateTime<Utc>>,
}

impl BadgeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, badge_id: &str) -> bool {
        self.unlocked.contains_key(badge_id)
    }

    pub fn unlocked_at(&self, badge_id: &str) -> Option<DateTime<Utc>> {
        self.unlocked.get(badge_id).copied()
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    /// Unlocked badge ids with their timestamps, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> + '_ {
        self.unlocked.iter().map(|(id, at)| (id.as_str(), *at))
    }

    /// Unlock every locked badge whose predicate now holds.
    ///
    /// Already-unlocked badges are skipped without evaluating their
    /// predicate. Returns only the badges unlocked by this call, stamped
    /// with `now`.
    pub fn evaluate(
        &mut self,
        catalog: &[BadgeDefinition],
        registry: &PredicateRegistry,
        state: &ChildState,
        now: DateTime<Utc>,
    ) -> Vec<BadgeUnlock> {
        let mut newly_unlocked = Vec::new();

        for badge in catalog {
            if self.is_unlocked(&badge.id) {
                continue;
            }

            match registry.evaluate(&badge.predicate, state) {
                Some(true) => {
                    self.unlocked.insert(badge.id.clone(), now);
                    tracing::info!(badge = %badge.id, tier = %badge.tier, "badge unlocked");
                    newly_unlocked.push(BadgeUnlock {
                        badge_id: badge.id.clone(),
                        tier: badge.tier,
                        unlocked_at: now,
                    });
                }
                Some(false) => {}
                None => {
                    tracing::warn!(
                        "badge '{}' references unknown predicate '{}', skipping",
                        badge.id,
                        badge.predicate
                    );
                }
            }
        }

        newly_unlocked
    }

    /// Save the ledger as JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize badge ledger")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write badge ledger to {}", path.display()))?;
        Ok(())
    }

    /// Load a ledger from JSON, or start empty if the file does not exist.
    pub fn load_json_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read badge ledger from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse badge ledger JSON")
    }
}
