//! Error and warning types.
//!
//! `ScreeningError` covers the local failures of a screening attempt.
//! `SubmitError` adds the store failure that can happen once a result is
//! handed off for persistence. `DataIntegrityWarning` is never raised: it is
//! returned next to a computed value so the caller can surface bad goal rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while answering or scoring a screening questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreeningError {
    /// Scoring was attempted before every item had an answer.
    #[error("screening is incomplete: {answered} of {required} questions answered")]
    Incomplete { answered: usize, required: usize },

    /// A question number outside 1..=20 was supplied.
    #[error("question number {0} is out of range (expected 1-20)")]
    QuestionOutOfRange(u8),
}

/// Errors produced when a finished screening is handed to a store.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The session could not be scored; the store was never called.
    #[error(transparent)]
    Screening(#[from] ScreeningError),

    /// The store rejected the write. The message is passed through verbatim.
    #[error("failed to persist screening: {0:#}")]
    Persistence(anyhow::Error),
}

impl SubmitError {
    /// Returns `true` if resubmitting the same, unchanged session may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Persistence(_))
    }
}

/// A goal row that could not be taken at face value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIntegrityWarning {
    /// `target_frequency` was zero or negative; the goal counts as fully met.
    NonPositiveTarget { goal_id: String, target: i64 },
    /// `frequency_period` was not daily, weekly or monthly; daily was used.
    UnknownPeriod { goal_id: String, period: String },
}

impl fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataIntegrityWarning::NonPositiveTarget { goal_id, target } => write!(
                f,
                "goal {goal_id}: target frequency {target} is not positive, treating as met"
            ),
            DataIntegrityWarning::UnknownPeriod { goal_id, period } => write!(
                f,
                "goal {goal_id}: unknown frequency period '{period}', using daily"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_message_lists_counts() {
        let err = ScreeningError::Incomplete {
            answered: 19,
            required: 20,
        };
        assert_eq!(
            err.to_string(),
            "screening is incomplete: 19 of 20 questions answered"
        );
    }

    #[test]
    fn only_persistence_failures_are_retryable() {
        let incomplete: SubmitError = ScreeningError::Incomplete {
            answered: 3,
            required: 20,
        }
        .into();
        assert!(!incomplete.is_retryable());

        let store = SubmitError::Persistence(anyhow::anyhow!("connection reset"));
        assert!(store.is_retryable());
        assert!(store.to_string().contains("connection reset"));
    }

    #[test]
    fn warning_display() {
        let w = DataIntegrityWarning::UnknownPeriod {
            goal_id: "g1".into(),
            period: "fortnightly".into(),
        };
        assert!(w.to_string().contains("fortnightly"));
    }
}
