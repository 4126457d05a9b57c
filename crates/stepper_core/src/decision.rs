use serde::Serialize;
use shared::domain::Side;

/// One judged user decision. Never modified once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRecord<T> {
    /// The two values the decision was about, in presentation order.
    pub compared: (T, T),
    pub answer: Side,
    pub expected: Side,
    pub correct: bool,
    /// Merge level, partition number or search iteration.
    pub round: usize,
}

impl<T> DecisionRecord<T> {
    pub(crate) fn judge(compared: (T, T), answer: Side, expected: Side, round: usize) -> Self {
        Self {
            compared,
            answer,
            expected,
            correct: answer == expected,
            round,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionTally {
    pub decisions: usize,
    pub correct: usize,
}

impl DecisionTally {
    pub fn from_records<T>(records: &[DecisionRecord<T>]) -> Self {
        Self {
            decisions: records.len(),
            correct: records.iter().filter(|record| record.correct).count(),
        }
    }

    pub fn incorrect(&self) -> usize {
        self.decisions - self.correct
    }

    /// Percentage of correct decisions, two decimals, `0.0` when empty.
    pub fn precision(&self) -> f64 {
        percentage(self.correct, self.decisions)
    }
}

pub(crate) fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn feedback(correct: bool, detail: impl AsRef<str>) -> String {
    if correct {
        format!("Correct! {}", detail.as_ref())
    } else {
        format!("Oops! {}", detail.as_ref())
    }
}
