//! Goal progress over calendar windows.
//!
//! Every screen that shows "3 of 5 this week" goes through
//! [`compute_goal_progress`], so the day/week/month boundary rules live in
//! one place. Windows are computed in the time zone of the `now` the caller
//! passes; event instants are converted into that zone before comparison.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::DataIntegrityWarning;
use crate::model::{FrequencyPeriod, Goal, LogEvent};

/// The calendar window a goal's target is measured in, in local wall time.
///
/// `start` is inclusive. `end` is the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressWindow {
    pub period: FrequencyPeriod,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ProgressWindow {
    /// Window of `period` containing the local wall time `now`.
    pub fn containing(period: FrequencyPeriod, now: NaiveDateTime) -> Self {
        Self {
            period,
            start: window_start(period, now),
            end: now,
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start
    }
}

/// Progress of one goal in its current window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: String,
    pub window: ProgressWindow,
    /// Log events inside the window.
    pub count: u32,
    /// The configured target, as stored.
    pub target: i64,
    /// `count / target`, clamped to `[0, 1]`.
    pub ratio: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataIntegrityWarning>,
}

impl GoalProgress {
    /// Whether the goal's target has been reached in this window.
    ///
    /// A non-positive target is never met, even though its ratio reads 1.0.
    pub fn is_met(&self) -> bool {
        self.target > 0 && self.ratio >= 1.0
    }
}

/// Midnight that opens the window of `period` containing `now`.
///
/// Weeks start on Sunday.
pub fn window_start(period: FrequencyPeriod, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date();
    let first_day = match period {
        FrequencyPeriod::Daily => today,
        FrequencyPeriod::Weekly => {
            today - Days::new(u64::from(today.weekday().num_days_from_sunday()))
        }
        FrequencyPeriod::Monthly => today - Days::new(u64::from(today.day0())),
    };
    first_day.and_time(NaiveTime::MIN)
}

/// `count / target`, clamped to `[0, 1]`. A non-positive target counts as
/// always met.
pub fn completion_ratio(count: u32, target: i64) -> f64 {
    if target <= 0 {
        return 1.0;
    }
    (f64::from(count) / target as f64).clamp(0.0, 1.0)
}

/// Resolve a stored period string, falling back to daily.
pub fn resolve_period(goal: &Goal) -> (FrequencyPeriod, Option<DataIntegrityWarning>) {
    match goal.frequency_period.parse::<FrequencyPeriod>() {
        Ok(period) => (period, None),
        Err(_) => (
            FrequencyPeriod::Daily,
            Some(DataIntegrityWarning::UnknownPeriod {
                goal_id: goal.id.clone(),
                period: goal.frequency_period.clone(),
            }),
        ),
    }
}

/// Progress of `goal` at `now`, counting `events` that fall in the window.
///
/// `events` are expected to belong to `goal`; they are not filtered by id.
/// Malformed goal rows produce warnings, never errors.
pub fn compute_goal_progress<Tz: TimeZone>(
    goal: &Goal,
    now: &DateTime<Tz>,
    events: &[LogEvent],
) -> GoalProgress {
    progress_over(goal, now, events.iter())
}

fn progress_over<'a, Tz: TimeZone>(
    goal: &Goal,
    now: &DateTime<Tz>,
    events: impl Iterator<Item = &'a LogEvent>,
) -> GoalProgress {
    let mut warnings = Vec::new();

    let (period, period_warning) = resolve_period(goal);
    warnings.extend(period_warning);

    if goal.target_frequency <= 0 {
        warnings.push(DataIntegrityWarning::NonPositiveTarget {
            goal_id: goal.id.clone(),
            target: goal.target_frequency,
        });
    }

    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    let tz = now.timezone();
    let window = ProgressWindow::containing(period, now.naive_local());
    let count = events
        .filter(|e| window.contains(e.occurred_at.with_timezone(&tz).naive_local()))
        .count() as u32;
    let ratio = completion_ratio(count, goal.target_frequency);

    tracing::debug!(
        goal = %goal.id,
        %period,
        start = %window.start,
        count,
        ratio,
        "computed goal progress"
    );

    GoalProgress {
        goal_id: goal.id.clone(),
        window,
        count,
        target: goal.target_frequency,
        ratio,
        warnings,
    }
}

/// Progress for every goal, with events grouped by `goal_id`.
///
/// Events referring to goals not in `goals` are ignored. Output order
/// follows `goals`.
pub fn compute_goal_progress_batch<Tz: TimeZone>(
    goals: &[Goal],
    events: &[LogEvent],
    now: &DateTime<Tz>,
) -> Vec<GoalProgress> {
    let mut grouped: HashMap<&str, Vec<&LogEvent>> = HashMap::new();
    for e in events {
        grouped.entry(e.goal_id.as_str()).or_default().push(e);
    }

    goals
        .iter()
        .map(|goal| {
            let goal_events = grouped
                .get(goal.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            progress_over(goal, now, goal_events.iter().copied())
        })
        .collect()
}

/// Consecutive local calendar days, ending today, with at least one event.
///
/// A streak is still alive if nothing has been logged yet today but
/// yesterday had an event.
pub fn current_streak<Tz: TimeZone>(events: &[LogEvent], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: BTreeSet<NaiveDate> = events
        .iter()
        .map(|e| e.occurred_at.with_timezone(&tz).date_naive())
        .collect();

    let today = now.date_naive();
    let mut day = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc, Weekday};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn event(goal_id: &str, when: &str) -> LogEvent {
        LogEvent {
            goal_id: goal_id.into(),
            occurred_at: at(when),
            stars_earned: 1,
        }
    }

    fn goal(id: &str, target: i64, period: &str) -> Goal {
        Goal {
            id: id.into(),
            title: String::new(),
            target_frequency: target,
            frequency_period: period.into(),
        }
    }

    #[test]
    fn calendar_fixture_is_what_the_tests_assume() {
        assert_eq!(at("2026-10-18T12:00:00Z").weekday(), Weekday::Sun);
        assert_eq!(at("2026-10-19T12:00:00Z").weekday(), Weekday::Mon);
    }

    #[test]
    fn window_start_rules() {
        let now = at("2026-10-22T15:45:10Z").naive_utc();
        assert_eq!(
            window_start(FrequencyPeriod::Daily, now),
            at("2026-10-22T00:00:00Z").naive_utc()
        );
        assert_eq!(
            window_start(FrequencyPeriod::Weekly, now),
            at("2026-10-18T00:00:00Z").naive_utc()
        );
        assert_eq!(
            window_start(FrequencyPeriod::Monthly, now),
            at("2026-10-01T00:00:00Z").naive_utc()
        );
    }

    #[test]
    fn weekly_window_on_sunday_starts_that_day() {
        let now = at("2026-10-18T08:00:00Z").naive_utc();
        assert_eq!(
            window_start(FrequencyPeriod::Weekly, now),
            at("2026-10-18T00:00:00Z").naive_utc()
        );
    }

    #[test]
    fn weekly_goal_counts_monday_and_wednesday() {
        let g = goal("reading", 3, "weekly");
        let now = at("2026-10-22T09:00:00Z");
        let events = vec![
            event("reading", "2026-10-17T18:00:00Z"), // previous Saturday
            event("reading", "2026-10-19T10:00:00Z"), // Monday
            event("reading", "2026-10-21T16:30:00Z"), // Wednesday
        ];

        let progress = compute_goal_progress(&g, &now, &events);
        assert_eq!(progress.window.start, at("2026-10-18T00:00:00Z").naive_utc());
        assert_eq!(progress.count, 2);
        assert!((progress.ratio - 2.0 / 3.0).abs() < 1e-9);
        assert!(!progress.is_met());
        assert!(progress.warnings.is_empty());
    }

    #[test]
    fn weekly_boundary_is_inclusive_to_the_millisecond() {
        let g = goal("g", 10, "weekly");
        let now = at("2026-10-20T12:00:00Z");
        let boundary = at("2026-10-18T00:00:00Z");

        let on = LogEvent {
            goal_id: "g".into(),
            occurred_at: boundary,
            stars_earned: 1,
        };
        let before = LogEvent {
            occurred_at: boundary - Duration::milliseconds(1),
            ..on.clone()
        };

        assert_eq!(compute_goal_progress(&g, &now, &[on]).count, 1);
        assert_eq!(compute_goal_progress(&g, &now, &[before]).count, 0);
    }

    #[test]
    fn empty_events_give_zero_ratio() {
        let progress = compute_goal_progress(&goal("g", 4, "daily"), &at("2026-10-19T12:00:00Z"), &[]);
        assert_eq!(progress.count, 0);
        assert_eq!(progress.ratio, 0.0);
    }

    #[test]
    fn zero_target_is_met_with_warning() {
        let progress = compute_goal_progress(&goal("g", 0, "daily"), &at("2026-10-19T12:00:00Z"), &[]);
        assert_eq!(progress.ratio, 1.0);
        assert_eq!(
            progress.warnings,
            vec![DataIntegrityWarning::NonPositiveTarget {
                goal_id: "g".into(),
                target: 0
            }]
        );
    }

    #[test]
    fn zero_target_is_not_met() {
        let now = at("2026-10-19T12:00:00Z");
        for target in [0, -2] {
            let progress = compute_goal_progress(&goal("g", target, "daily"), &now, &[]);
            assert_eq!(progress.ratio, 1.0);
            assert!(!progress.is_met(), "target {target}");
        }
    }

    #[test]
    fn unknown_period_falls_back_to_daily() {
        let now = at("2026-10-22T09:00:00Z");
        let events = vec![
            event("g", "2026-10-21T09:00:00Z"),
            event("g", "2026-10-22T08:00:00Z"),
        ];
        let progress = compute_goal_progress(&goal("g", 2, "fortnightly"), &now, &events);
        assert_eq!(progress.window.period, FrequencyPeriod::Daily);
        assert_eq!(progress.count, 1);
        assert!(matches!(
            progress.warnings.as_slice(),
            [DataIntegrityWarning::UnknownPeriod { .. }]
        ));
    }

    #[test]
    fn ratio_is_clamped() {
        let now = at("2026-10-22T09:00:00Z");
        let events: Vec<LogEvent> = (0..5).map(|_| event("g", "2026-10-22T07:00:00Z")).collect();
        let progress = compute_goal_progress(&goal("g", 2, "daily"), &now, &events);
        assert_eq!(progress.count, 5);
        assert_eq!(progress.ratio, 1.0);
        assert!(progress.is_met());

        for target in -3..10 {
            for count in 0..12 {
                let r = completion_ratio(count, target);
                assert!((0.0..=1.0).contains(&r), "count {count} target {target}");
            }
        }
    }

    #[test]
    fn monthly_window_ignores_last_month() {
        let now = at("2026-10-19T12:00:00Z");
        let events = vec![
            event("g", "2026-09-30T23:59:59Z"),
            event("g", "2026-10-01T00:00:00Z"),
            event("g", "2026-10-15T10:00:00Z"),
        ];
        let progress = compute_goal_progress(&goal("g", 4, "monthly"), &now, &events);
        assert_eq!(progress.count, 2);
        assert!((progress.ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn window_follows_callers_time_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        // 00:30 local on Monday is still Sunday evening in UTC.
        let now = at("2026-10-18T22:30:00Z").with_timezone(&tz);
        let events = vec![
            event("g", "2026-10-18T21:59:00Z"), // 23:59 local Sunday
            event("g", "2026-10-18T22:15:00Z"), // 00:15 local Monday
        ];
        let progress = compute_goal_progress(&goal("g", 1, "daily"), &now, &events);
        assert_eq!(progress.count, 1);
    }

    #[test]
    fn compute_does_not_mutate_inputs() {
        let g = goal("g", 2, "weekly");
        let events = vec![event("g", "2026-10-19T10:00:00Z")];
        let (g_before, events_before) = (g.clone(), events.clone());
        let _ = compute_goal_progress(&g, &at("2026-10-20T10:00:00Z"), &events);
        assert_eq!(g, g_before);
        assert_eq!(events, events_before);
    }

    #[test]
    fn batch_groups_events_by_goal() {
        let goals = vec![goal("a", 2, "daily"), goal("b", 1, "weekly"), goal("c", 1, "daily")];
        let events = vec![
            event("a", "2026-10-20T08:00:00Z"),
            event("b", "2026-10-19T08:00:00Z"),
            event("a", "2026-10-20T09:00:00Z"),
            event("zzz", "2026-10-20T09:00:00Z"),
        ];
        let progress = compute_goal_progress_batch(&goals, &events, &at("2026-10-20T12:00:00Z"));
        let counts: Vec<(&str, u32)> = progress
            .iter()
            .map(|p| (p.goal_id.as_str(), p.count))
            .collect();
        assert_eq!(counts, vec![("a", 2), ("b", 1), ("c", 0)]);
    }

    #[test]
    fn batch_matches_per_goal_computation() {
        let now = at("2026-10-21T12:00:00Z");
        let goals = vec![goal("a", 3, "weekly"), goal("b", 0, "monthly")];
        let events = vec![
            event("b", "2026-10-02T08:00:00Z"),
            event("a", "2026-10-17T08:00:00Z"),
            event("a", "2026-10-19T08:00:00Z"),
            event("b", "2026-10-20T08:00:00Z"),
        ];

        let batch = compute_goal_progress_batch(&goals, &events, &now);
        for (g, p) in goals.iter().zip(&batch) {
            let own: Vec<LogEvent> = events.iter().filter(|e| e.goal_id == g.id).cloned().collect();
            assert_eq!(*p, compute_goal_progress(g, &now, &own));
        }
        assert_eq!(batch[1].count, 2);
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let now = at("2026-10-22T20:00:00Z");
        let events = vec![
            event("g", "2026-10-22T08:00:00Z"),
            event("g", "2026-10-21T08:00:00Z"),
            event("g", "2026-10-21T09:00:00Z"),
            event("g", "2026-10-20T08:00:00Z"),
            event("g", "2026-10-18T08:00:00Z"),
        ];
        assert_eq!(current_streak(&events, &now), 3);
    }

    #[test]
    fn streak_survives_until_today_is_logged() {
        let now = at("2026-10-22T07:00:00Z");
        let events = vec![
            event("g", "2026-10-21T08:00:00Z"),
            event("g", "2026-10-20T08:00:00Z"),
        ];
        assert_eq!(current_streak(&events, &now), 2);

        let stale = vec![event("g", "2026-10-19T08:00:00Z")];
        assert_eq!(current_streak(&stale, &now), 0);
        assert_eq!(current_streak(&[], &now), 0);
    }
}
