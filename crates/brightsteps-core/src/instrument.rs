//! The screening instrument: item table plus risk banding.
//!
//! The built-in table follows the published M-CHAT-R scoring rules. Item
//! wording is paraphrased; deployments that license the official wording
//! load it from a TOML file instead (see `parser`).

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionNumber, QUESTION_COUNT};

/// Cut points that turn a total score into a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskBands {
    /// Lowest total score that is medium risk.
    #[serde(default = "default_medium_at")]
    pub medium_at: u8,
    /// Lowest total score that is high risk.
    #[serde(default = "default_high_at")]
    pub high_at: u8,
    /// A critical-fail count above this raises low risk to medium.
    #[serde(default = "default_critical_fail_minimum")]
    pub critical_fail_minimum: u8,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            medium_at: default_medium_at(),
            high_at: default_high_at(),
            critical_fail_minimum: default_critical_fail_minimum(),
        }
    }
}

fn default_medium_at() -> u8 {
    3
}

fn default_high_at() -> u8 {
    8
}

fn default_critical_fail_minimum() -> u8 {
    1
}

/// A complete questionnaire definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Sorted by question number.
    pub questions: Vec<Question>,
    #[serde(default)]
    pub bands: RiskBands,
}

/// Items whose risk-indicating answer is "yes".
const REVERSE_SCORED: [u8; 3] = [2, 5, 12];

/// Items counted towards the critical-fail rule.
pub const CRITICAL_ITEM_NUMBERS: [u8; 6] = [1, 7, 8, 9, 10, 15];

const MCHAT_R_ITEMS: [(&str, &[&str]); QUESTION_COUNT] = [
    (
        "If you point at something across the room, does your child look at it?",
        &["If you point at a toy or an animal, does your child look at the toy or animal?"],
    ),
    ("Have you ever wondered if your child might be deaf?", &[]),
    (
        "Does your child play pretend or make-believe?",
        &["Pretend to drink from an empty cup", "Pretend to talk on a phone", "Pretend to feed a doll or stuffed animal"],
    ),
    (
        "Does your child like climbing on things?",
        &["Furniture", "Playground equipment", "Stairs"],
    ),
    (
        "Does your child make unusual finger movements near their eyes?",
        &["Wiggle fingers close to the eyes"],
    ),
    (
        "Does your child point with one finger to ask for something or to get help?",
        &["Pointing to a snack or toy that is out of reach"],
    ),
    (
        "Does your child point with one finger to show you something interesting?",
        &["Pointing to an airplane in the sky or a big truck in the road"],
    ),
    (
        "Is your child interested in other children?",
        &["Watching other children", "Smiling at them", "Going to them"],
    ),
    (
        "Does your child show you things by bringing them to you or holding them up for you to see, just to share?",
        &["Showing a flower, a stuffed animal, or a toy truck"],
    ),
    (
        "Does your child respond when you call their name?",
        &["Looking up", "Talking or babbling", "Stopping what they are doing"],
    ),
    ("When you smile at your child, do they smile back at you?", &[]),
    (
        "Does your child get upset by everyday noises?",
        &["Screaming or crying at a vacuum cleaner or loud music"],
    ),
    ("Does your child walk?", &[]),
    (
        "Does your child look you in the eye when you are talking to them, playing with them, or dressing them?",
        &[],
    ),
    (
        "Does your child try to copy what you do?",
        &["Waving bye-bye", "Clapping", "Making a funny noise when you do"],
    ),
    (
        "If you turn your head to look at something, does your child look around to see what you are looking at?",
        &[],
    ),
    (
        "Does your child try to get you to watch them?",
        &["Looking at you for praise", "Saying \"look\" or \"watch me\""],
    ),
    (
        "Does your child understand when you tell them to do something?",
        &["Without pointing, can your child understand \"put the book on the chair\" or \"bring me the blanket\"?"],
    ),
    (
        "If something new happens, does your child look at your face to see how you feel about it?",
        &["Hearing a strange or funny noise", "Seeing a new toy"],
    ),
    (
        "Does your child like movement activities?",
        &["Being swung", "Being bounced on your knee"],
    ),
];

impl Instrument {
    /// The built-in M-CHAT-R item table with its standard bands.
    pub fn mchat_r() -> Self {
        let questions = QuestionNumber::all()
            .zip(MCHAT_R_ITEMS.iter())
            .map(|(number, (text, examples))| Question {
                number,
                text: (*text).to_string(),
                examples: examples.iter().map(|e| (*e).to_string()).collect(),
                critical: CRITICAL_ITEM_NUMBERS.contains(&number.get()),
                risk_answer: REVERSE_SCORED.contains(&number.get()),
            })
            .collect();

        Self {
            id: "mchat-r".to_string(),
            name: "M-CHAT-R".to_string(),
            description: "Modified Checklist for Autism in Toddlers, Revised".to_string(),
            questions,
            bands: RiskBands::default(),
        }
    }

    /// Look up a question by number.
    pub fn question(&self, number: QuestionNumber) -> Option<&Question> {
        self.questions.iter().find(|q| q.number == number)
    }

    /// Numbers of the critical items, ascending.
    pub fn critical_numbers(&self) -> Vec<QuestionNumber> {
        let mut numbers: Vec<QuestionNumber> = self
            .questions
            .iter()
            .filter(|q| q.critical)
            .map(|q| q.number)
            .collect();
        numbers.sort();
        numbers
    }

    /// Per-slot risk polarity, indexed by `QuestionNumber::index`.
    ///
    /// `None` marks a slot the instrument does not define.
    pub(crate) fn polarity_table(&self) -> [Option<(bool, bool)>; QUESTION_COUNT] {
        let mut table = [None; QUESTION_COUNT];
        for q in &self.questions {
            table[q.number.index()] = Some((q.risk_answer, q.critical));
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mchat_r_has_twenty_ordered_items() {
        let instrument = Instrument::mchat_r();
        assert_eq!(instrument.questions.len(), QUESTION_COUNT);
        for (i, q) in instrument.questions.iter().enumerate() {
            assert_eq!(q.number.index(), i);
            assert!(!q.text.is_empty());
        }
    }

    #[test]
    fn mchat_r_reverse_scored_items() {
        let instrument = Instrument::mchat_r();
        let reversed: Vec<u8> = instrument
            .questions
            .iter()
            .filter(|q| q.is_reverse_scored())
            .map(|q| q.number.get())
            .collect();
        assert_eq!(reversed, vec![2, 5, 12]);
    }

    #[test]
    fn mchat_r_has_six_critical_items() {
        let instrument = Instrument::mchat_r();
        let critical: Vec<u8> = instrument
            .critical_numbers()
            .into_iter()
            .map(QuestionNumber::get)
            .collect();
        assert_eq!(critical, CRITICAL_ITEM_NUMBERS.to_vec());
    }

    #[test]
    fn default_bands() {
        let bands = RiskBands::default();
        assert_eq!(bands.medium_at, 3);
        assert_eq!(bands.high_at, 8);
        assert_eq!(bands.critical_fail_minimum, 1);
    }
}
