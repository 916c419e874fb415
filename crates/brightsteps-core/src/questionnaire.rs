//! In-progress screening attempts.
//!
//! A `QuestionnaireSession` owns the answers collected so far and the cursor
//! of the question on screen. It never talks to a store; the caller submits
//! a finished session through `traits::submit_screening`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ScreeningError;
use crate::model::{QuestionNumber, ScreeningResult, QUESTION_COUNT};
use crate::scoring::ScoringEngine;

/// Answers keyed by question number. Complete iff all 20 keys are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<QuestionNumber, bool>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the answer for `number`.
    pub fn set(&mut self, number: QuestionNumber, value: bool) {
        self.0.insert(number, value);
    }

    pub fn get(&self, number: QuestionNumber) -> Option<bool> {
        self.0.get(&number).copied()
    }

    pub fn remove(&mut self, number: QuestionNumber) -> Option<bool> {
        self.0.remove(&number)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() == QUESTION_COUNT
    }

    /// Unanswered question numbers, ascending.
    pub fn missing(&self) -> Vec<QuestionNumber> {
        QuestionNumber::all()
            .filter(|n| !self.0.contains_key(n))
            .collect()
    }

    /// Answers in question order.
    pub fn iter(&self) -> impl Iterator<Item = (QuestionNumber, bool)> + '_ {
        self.0.iter().map(|(n, v)| (*n, *v))
    }
}

impl FromIterator<(QuestionNumber, bool)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (QuestionNumber, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Coarse completion state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unanswered,
    InProgress,
    Complete,
}

/// Aggregated view of session progress, used for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

/// One screening attempt in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnaireSession {
    answers: AnswerSet,
    cursor: QuestionNumber,
}

impl Default for QuestionnaireSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionnaireSession {
    pub fn new() -> Self {
        Self {
            answers: AnswerSet::new(),
            cursor: QuestionNumber::FIRST,
        }
    }

    /// Resume an attempt from previously collected answers.
    ///
    /// The cursor lands on the first unanswered question, or the last one if
    /// the set is already complete.
    pub fn resume(answers: AnswerSet) -> Self {
        let cursor = answers
            .missing()
            .first()
            .copied()
            .unwrap_or(QuestionNumber::LAST);
        Self { answers, cursor }
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// Question currently on screen.
    pub fn current(&self) -> QuestionNumber {
        self.cursor
    }

    /// Record an answer. Questions may be answered in any order; answering
    /// the same question again replaces the previous answer.
    pub fn set_answer(&mut self, number: u8, value: bool) -> Result<(), ScreeningError> {
        let number = QuestionNumber::new(number)?;
        self.answers.set(number, value);
        Ok(())
    }

    /// Answer the question under the cursor.
    pub fn answer_current(&mut self, value: bool) {
        self.answers.set(self.cursor, value);
    }

    pub fn answer(&self, number: QuestionNumber) -> Option<bool> {
        self.answers.get(number)
    }

    pub fn clear_answer(&mut self, number: QuestionNumber) -> Option<bool> {
        self.answers.remove(number)
    }

    /// Move to the next question. A no-op on question 20.
    pub fn advance(&mut self) -> QuestionNumber {
        if let Some(next) = self.cursor.next() {
            self.cursor = next;
        }
        self.cursor
    }

    /// Move to the previous question. A no-op on question 1.
    pub fn retreat(&mut self) -> QuestionNumber {
        if let Some(prev) = self.cursor.prev() {
            self.cursor = prev;
        }
        self.cursor
    }

    pub fn jump_to(&mut self, number: QuestionNumber) {
        self.cursor = number;
    }

    pub fn is_complete(&self) -> bool {
        self.answers.is_complete()
    }

    pub fn state(&self) -> SessionState {
        match self.answers.len() {
            0 => SessionState::Unanswered,
            n if n == QUESTION_COUNT => SessionState::Complete,
            _ => SessionState::InProgress,
        }
    }

    pub fn first_unanswered(&self) -> Option<QuestionNumber> {
        self.answers.missing().first().copied()
    }

    pub fn unanswered(&self) -> Vec<QuestionNumber> {
        self.answers.missing()
    }

    pub fn progress(&self) -> SessionProgress {
        let answered = self.answers.len();
        SessionProgress {
            total: QUESTION_COUNT,
            answered,
            remaining: QUESTION_COUNT - answered,
            is_complete: answered == QUESTION_COUNT,
        }
    }

    /// Score the session. Fails with `Incomplete` until all 20 answers are in;
    /// the session itself is left untouched either way.
    pub fn submit(&self, engine: &ScoringEngine) -> Result<ScreeningResult, ScreeningError> {
        engine.score(&self.answers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: u8) -> QuestionNumber {
        QuestionNumber::new(n).unwrap()
    }

    #[test]
    fn new_session_is_unanswered_at_first_question() {
        let session = QuestionnaireSession::new();
        assert_eq!(session.state(), SessionState::Unanswered);
        assert_eq!(session.current(), q(1));
        assert!(!session.is_complete());
        assert_eq!(session.first_unanswered(), Some(q(1)));
    }

    #[test]
    fn answers_out_of_order_and_overwrite() {
        let mut session = QuestionnaireSession::new();
        session.set_answer(17, true).unwrap();
        session.set_answer(3, false).unwrap();
        session.set_answer(17, false).unwrap();

        assert_eq!(session.answer(q(17)), Some(false));
        assert_eq!(session.answer(q(3)), Some(false));
        assert_eq!(session.answers().len(), 2);
        assert_eq!(session.state(), SessionState::InProgress);
    }

    #[test]
    fn set_answer_rejects_out_of_range() {
        let mut session = QuestionnaireSession::new();
        assert_eq!(
            session.set_answer(0, true),
            Err(ScreeningError::QuestionOutOfRange(0))
        );
        assert_eq!(
            session.set_answer(21, true),
            Err(ScreeningError::QuestionOutOfRange(21))
        );
        assert!(session.answers().is_empty());
    }

    #[test]
    fn cursor_is_clamped() {
        let mut session = QuestionnaireSession::new();
        assert_eq!(session.retreat(), q(1));

        for _ in 0..30 {
            session.advance();
        }
        assert_eq!(session.current(), q(20));
        assert_eq!(session.advance(), q(20));
        assert_eq!(session.retreat(), q(19));
    }

    #[test]
    fn completeness_tracks_answer_count_only() {
        let mut session = QuestionnaireSession::new();
        for n in 1..=20 {
            assert!(!session.is_complete());
            session.set_answer(n, n % 2 == 0).unwrap();
        }
        assert!(session.is_complete());
        assert_eq!(session.state(), SessionState::Complete);

        // Navigating back into a complete set does not change completeness.
        session.jump_to(q(4));
        session.retreat();
        session.answer_current(true);
        assert!(session.is_complete());

        session.clear_answer(q(9));
        assert!(!session.is_complete());
        assert_eq!(session.unanswered(), vec![q(9)]);
    }

    #[test]
    fn complete_iff_twenty_keys_for_every_prefix_and_gap() {
        for skip in 1..=20u8 {
            let answers: AnswerSet = QuestionNumber::all()
                .filter(|n| n.get() != skip)
                .map(|n| (n, true))
                .collect();
            assert_eq!(answers.len(), 19);
            assert!(!answers.is_complete());
            assert_eq!(answers.missing(), vec![q(skip)]);
        }
    }

    #[test]
    fn progress_counts() {
        let mut session = QuestionnaireSession::new();
        session.set_answer(1, true).unwrap();
        session.set_answer(2, false).unwrap();
        let progress = session.progress();
        assert_eq!(progress.total, 20);
        assert_eq!(progress.answered, 2);
        assert_eq!(progress.remaining, 18);
        assert!(!progress.is_complete);
    }

    #[test]
    fn resume_places_cursor_on_first_gap() {
        let answers: AnswerSet = [(q(1), true), (q(2), false), (q(4), true)]
            .into_iter()
            .collect();
        let session = QuestionnaireSession::resume(answers);
        assert_eq!(session.current(), q(3));
    }

    #[test]
    fn submit_incomplete_is_rejected_and_session_kept() {
        let engine = ScoringEngine::mchat_r();
        let mut session = QuestionnaireSession::new();
        for n in 1..=19 {
            session.set_answer(n, true).unwrap();
        }
        let before = session.clone();

        let err = session.submit(&engine).unwrap_err();
        assert_eq!(
            err,
            ScreeningError::Incomplete {
                answered: 19,
                required: 20
            }
        );
        assert_eq!(session, before);
    }

    #[test]
    fn answer_set_json_uses_question_number_keys() {
        let answers: AnswerSet = [(q(1), true), (q(12), false)].into_iter().collect();
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(json, r#"{"1":true,"12":false}"#);

        let parsed: AnswerSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, answers);

        assert!(serde_json::from_str::<AnswerSet>(r#"{"21":true}"#).is_err());
    }
}
