//! brightsteps-core — Screening, scoring, and progress computation.
//!
//! This crate holds the M-CHAT-R questionnaire session and scoring engine,
//! goal progress windows, and the milestone and badge evaluator that the
//! brightsteps CLI and app backends build on.

pub mod config;
pub mod error;
pub mod instrument;
pub mod memory;
pub mod model;
pub mod parser;
pub mod progress;
pub mod questionnaire;
pub mod report;
pub mod rewards;
pub mod scoring;
pub mod traits;

pub use error::{DataIntegrityWarning, ScreeningError, SubmitError};
pub use instrument::{Instrument, RiskBands};
pub use model::{
    BadgeDefinition, BadgeTier, FrequencyPeriod, Goal, LogEvent, MilestoneThreshold,
    QuestionNumber, RewardCatalog, RiskLevel, ScreeningResult,
};
pub use progress::{compute_goal_progress, GoalProgress, ProgressWindow};
pub use questionnaire::{AnswerSet, QuestionnaireSession};
pub use rewards::{next_milestone, BadgeLedger, BadgeUnlock, ChildState, PredicateRegistry};
pub use scoring::ScoringEngine;
