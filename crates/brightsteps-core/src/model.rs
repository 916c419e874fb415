//! Core data model types for brightsteps.
//!
//! These are the shapes the computation core reads from the store (goals,
//! log events, reward catalogs) and the values it hands back (screening
//! results).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScreeningError;

/// Number of items on the screening questionnaire.
pub const QUESTION_COUNT: usize = 20;

/// A question number in `1..=20`.
///
/// Construction is the only place the range is checked; every `AnswerSet`
/// key is therefore valid by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct QuestionNumber(u8);

impl QuestionNumber {
    pub const FIRST: QuestionNumber = QuestionNumber(1);
    pub const LAST: QuestionNumber = QuestionNumber(QUESTION_COUNT as u8);

    pub fn new(n: u8) -> Result<Self, ScreeningError> {
        if (1..=QUESTION_COUNT as u8).contains(&n) {
            Ok(Self(n))
        } else {
            Err(ScreeningError::QuestionOutOfRange(n))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based slot index.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// The following question, or `None` on the last one.
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1).ok()
    }

    /// The preceding question, or `None` on the first one.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).and_then(|n| Self::new(n).ok())
    }

    /// All question numbers in ascending order.
    pub fn all() -> impl Iterator<Item = QuestionNumber> {
        (1..=QUESTION_COUNT as u8).map(QuestionNumber)
    }
}

impl TryFrom<u8> for QuestionNumber {
    type Error = ScreeningError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuestionNumber> for u8 {
    fn from(value: QuestionNumber) -> Self {
        value.0
    }
}

impl fmt::Display for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One item of the screening instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub number: QuestionNumber,
    /// The question as shown to the parent.
    pub text: String,
    /// Clarifying examples shown under the question.
    #[serde(default)]
    pub examples: Vec<String>,
    /// Whether this is one of the critical items.
    #[serde(default)]
    pub critical: bool,
    /// The answer that indicates risk. `false` ("no") for most items;
    /// `true` for the reverse-scored ones.
    pub risk_answer: bool,
}

impl Question {
    /// Whether `answer` scores a point on this item.
    pub fn scores(&self, answer: bool) -> bool {
        answer == self.risk_answer
    }

    pub fn is_reverse_scored(&self) -> bool {
        self.risk_answer
    }
}

/// Screening risk band. Ordered from lowest to highest risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Text shown to the parent next to the score.
    pub fn display_text(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk",
            RiskLevel::Medium => "Medium risk: follow-up recommended",
            RiskLevel::High => "High risk: refer for evaluation",
        }
    }

    /// Hex colour used for the risk badge.
    pub fn color(self) -> &'static str {
        match self {
            RiskLevel::Low => "#2E7D32",
            RiskLevel::Medium => "#F9A825",
            RiskLevel::High => "#C62828",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" | "moderate" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// The scored outcome of one completed questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// Items answered with their risk polarity (0-20).
    pub total_score: u8,
    pub risk_level: RiskLevel,
    /// `true` whenever the risk level is not low.
    pub follow_up_needed: bool,
    /// Critical items that scored a point.
    pub critical_fail_count: u8,
}

/// Recurrence cadence a goal's target is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for FrequencyPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrequencyPeriod::Daily => write!(f, "daily"),
            FrequencyPeriod::Weekly => write!(f, "weekly"),
            FrequencyPeriod::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for FrequencyPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(FrequencyPeriod::Daily),
            "weekly" | "week" => Ok(FrequencyPeriod::Weekly),
            "monthly" | "month" => Ok(FrequencyPeriod::Monthly),
            other => Err(format!("unknown frequency period: {other}")),
        }
    }
}

/// A developmental goal as stored.
///
/// `target_frequency` and `frequency_period` are kept raw: a bad value is a
/// data-integrity warning at computation time, not a load failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub target_frequency: i64,
    pub frequency_period: String,
}

/// One logged completion of a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub goal_id: String,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub stars_earned: u32,
}

/// Sum of `stars_earned` across a child's log events.
pub fn total_stars(events: &[LogEvent]) -> u32 {
    events
        .iter()
        .fold(0u32, |acc, e| acc.saturating_add(e.stars_earned))
}

/// A cumulative star threshold with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneThreshold {
    pub stars_required: u32,
    pub label: String,
}

/// Badge rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeTier::Bronze => write!(f, "bronze"),
            BadgeTier::Silver => write!(f, "silver"),
            BadgeTier::Gold => write!(f, "gold"),
            BadgeTier::Platinum => write!(f, "platinum"),
        }
    }
}

/// A permanently unlockable achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Name of the predicate in the `PredicateRegistry`.
    pub predicate: String,
    pub tier: BadgeTier,
}

/// Milestones and badges offered to a child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCatalog {
    /// Sorted ascending by `stars_required`.
    #[serde(default)]
    pub milestones: Vec<MilestoneThreshold>,
    #[serde(default)]
    pub badges: Vec<BadgeDefinition>,
}

impl RewardCatalog {
    /// The catalog shipped with the app.
    pub fn standard() -> Self {
        let milestone = |stars: u32, label: &str| MilestoneThreshold {
            stars_required: stars,
            label: label.to_string(),
        };
        let badge = |id: &str, name: &str, predicate: &str, tier: BadgeTier| BadgeDefinition {
            id: id.to_string(),
            name: name.to_string(),
            predicate: predicate.to_string(),
            tier,
        };

        Self {
            milestones: vec![
                milestone(1, "First Star"),
                milestone(10, "Rising Star"),
                milestone(25, "Star Collector"),
                milestone(50, "Superstar"),
                milestone(100, "Star Champion"),
                milestone(250, "Galaxy Explorer"),
                milestone(500, "Constellation Master"),
            ],
            badges: vec![
                badge("first-star", "First Star", "first_star", BadgeTier::Bronze),
                badge("star-25", "Quarter Century", "stars_25", BadgeTier::Bronze),
                badge("star-50", "Half Century", "stars_50", BadgeTier::Silver),
                badge("star-100", "Century", "stars_100", BadgeTier::Gold),
                badge("star-250", "Shooting Star", "stars_250", BadgeTier::Gold),
                badge("star-500", "Supernova", "stars_500", BadgeTier::Platinum),
                badge("goal-getter", "Goal Getter", "goal_met_1", BadgeTier::Bronze),
                badge("goal-crusher", "Goal Crusher", "goals_met_5", BadgeTier::Gold),
                badge("streak-3", "On a Roll", "streak_3", BadgeTier::Bronze),
                badge("streak-7", "Week Warrior", "streak_7", BadgeTier::Silver),
                badge("streak-30", "Unstoppable", "streak_30", BadgeTier::Platinum),
                badge("first-screening", "Check-in Champion", "first_screening", BadgeTier::Bronze),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_number_range() {
        assert!(QuestionNumber::new(0).is_err());
        assert!(QuestionNumber::new(21).is_err());
        assert_eq!(QuestionNumber::new(1).unwrap(), QuestionNumber::FIRST);
        assert_eq!(QuestionNumber::new(20).unwrap(), QuestionNumber::LAST);
        assert_eq!(QuestionNumber::LAST.next(), None);
        assert_eq!(QuestionNumber::FIRST.prev(), None);
        assert_eq!(QuestionNumber::all().count(), QUESTION_COUNT);
    }

    #[test]
    fn question_number_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<QuestionNumber>("7").is_ok());
        assert!(serde_json::from_str::<QuestionNumber>("0").is_err());
        assert!(serde_json::from_str::<QuestionNumber>("42").is_err());
    }

    #[test]
    fn risk_level_ordering_and_parse() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert_eq!("moderate".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert!("severe".parse::<RiskLevel>().is_err());
        assert_eq!(RiskLevel::Medium.to_string(), "medium");
    }

    #[test]
    fn risk_display_helpers_are_distinct() {
        let levels = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
        for a in levels {
            for b in levels {
                if a != b {
                    assert_ne!(a.color(), b.color());
                    assert_ne!(a.display_text(), b.display_text());
                }
            }
        }
    }

    #[test]
    fn frequency_period_parse() {
        assert_eq!("Weekly".parse::<FrequencyPeriod>().unwrap(), FrequencyPeriod::Weekly);
        assert_eq!("month".parse::<FrequencyPeriod>().unwrap(), FrequencyPeriod::Monthly);
        assert!("fortnightly".parse::<FrequencyPeriod>().is_err());
    }

    #[test]
    fn total_stars_sums_events() {
        let at = chrono::Utc::now();
        let events = vec![
            LogEvent {
                goal_id: "a".into(),
                occurred_at: at,
                stars_earned: 3,
            },
            LogEvent {
                goal_id: "b".into(),
                occurred_at: at,
                stars_earned: 4,
            },
        ];
        assert_eq!(total_stars(&events), 7);
        assert_eq!(total_stars(&[]), 0);
    }

    #[test]
    fn standard_catalog_milestones_sorted() {
        let catalog = RewardCatalog::standard();
        assert!(catalog
            .milestones
            .windows(2)
            .all(|w| w[0].stars_required < w[1].stars_required));
    }
}
