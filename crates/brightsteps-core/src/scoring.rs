//! Screening score computation.
//!
//! Scores a complete answer set against an instrument's item table and
//! assigns a risk band. Scoring never fills in missing answers: anything
//! short of 20 is rejected as incomplete.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::error::ScreeningError;
use crate::instrument::{Instrument, RiskBands};
use crate::model::{QuestionNumber, RiskLevel, ScreeningResult, QUESTION_COUNT};
use crate::questionnaire::AnswerSet;

/// Contribution of one item, for audit display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemScore {
    pub number: QuestionNumber,
    pub answer: bool,
    /// Whether the answer matched the item's risk polarity.
    pub scored: bool,
    pub critical: bool,
}

/// Stateless scorer bound to one instrument.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    instrument: Instrument,
    /// `(risk_answer, critical)` per slot.
    items: [(bool, bool); QUESTION_COUNT],
}

impl ScoringEngine {
    /// Build an engine for `instrument`.
    ///
    /// Fails if the instrument leaves a question slot undefined or its bands
    /// are not ordered.
    pub fn new(instrument: Instrument) -> Result<Self> {
        let table = instrument.polarity_table();
        let missing: Vec<String> = QuestionNumber::all()
            .filter(|n| table[n.index()].is_none())
            .map(|n| n.to_string())
            .collect();
        ensure!(
            missing.is_empty(),
            "instrument '{}' is missing questions: {}",
            instrument.id,
            missing.join(", ")
        );
        ensure!(
            instrument.bands.medium_at <= instrument.bands.high_at,
            "instrument '{}': medium_at ({}) must not exceed high_at ({})",
            instrument.id,
            instrument.bands.medium_at,
            instrument.bands.high_at
        );

        let mut items = [(false, false); QUESTION_COUNT];
        for (slot, entry) in items.iter_mut().zip(table.iter()) {
            if let Some(item) = entry {
                *slot = *item;
            }
        }

        Ok(Self { instrument, items })
    }

    /// Engine for the built-in M-CHAT-R table.
    pub fn mchat_r() -> Self {
        let instrument = Instrument::mchat_r();
        let mut items = [(false, false); QUESTION_COUNT];
        for q in &instrument.questions {
            items[q.number.index()] = (q.risk_answer, q.critical);
        }
        Self { instrument, items }
    }

    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    pub fn bands(&self) -> RiskBands {
        self.instrument.bands
    }

    /// Score a complete answer set.
    pub fn score(&self, answers: &AnswerSet) -> Result<ScreeningResult, ScreeningError> {
        let items = self.score_items(answers)?;

        let total_score = items.iter().filter(|i| i.scored).count() as u8;
        let critical_fail_count = items.iter().filter(|i| i.scored && i.critical).count() as u8;
        let risk_level = classify(total_score, critical_fail_count, &self.instrument.bands);

        tracing::debug!(
            instrument = %self.instrument.id,
            total_score,
            critical_fail_count,
            %risk_level,
            "scored screening"
        );

        Ok(ScreeningResult {
            total_score,
            risk_level,
            follow_up_needed: risk_level != RiskLevel::Low,
            critical_fail_count,
        })
    }

    /// Per-item breakdown of a complete answer set, in question order.
    pub fn score_items(&self, answers: &AnswerSet) -> Result<Vec<ItemScore>, ScreeningError> {
        if !answers.is_complete() {
            return Err(ScreeningError::Incomplete {
                answered: answers.len(),
                required: QUESTION_COUNT,
            });
        }

        Ok(answers
            .iter()
            .map(|(number, answer)| {
                let (risk_answer, critical) = self.items[number.index()];
                ItemScore {
                    number,
                    answer,
                    scored: answer == risk_answer,
                    critical,
                }
            })
            .collect())
    }
}

/// Map a total score and critical-fail count onto a risk band.
///
/// A critical-fail count above the minimum lifts the band to at least
/// medium; it never lowers it.
pub fn classify(total_score: u8, critical_fail_count: u8, bands: &RiskBands) -> RiskLevel {
    let by_total = if total_score >= bands.high_at {
        RiskLevel::High
    } else if total_score >= bands.medium_at {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    if critical_fail_count > bands.critical_fail_minimum {
        by_total.max(RiskLevel::Medium)
    } else {
        by_total
    }
}
