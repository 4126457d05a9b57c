//! Step-driven merge sort, quick sort and binary search.
//!
//! Each stepper owns a working copy of its input, pauses at every decision
//! point and judges the caller's answer against ground truth. The answer
//! only affects scoring: the algorithm always advances along the correct
//! trajectory, so every run terminates within the usual complexity bound.

use std::fmt;

use serde::Serialize;
use shared::domain::{Side, Strategy};

pub mod decision;
pub mod merge;
pub mod quick;
pub mod search;
pub mod sink;

pub use decision::{DecisionRecord, DecisionTally};
pub use merge::{MergeComparison, MergeHistory, MergePhase, MergeStatistics, MergeStepper};
pub use quick::{QuickComparison, QuickHistory, QuickPhase, QuickStatistics, QuickStepper};
pub use search::{
    IntervalSnapshot, SearchComparison, SearchOutcome, SearchPhase, SearchStatistics,
    SearchStepper,
};
pub use sink::{NoopSink, VisualSink};

/// Result of handing a decision to a stepper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Judged { correct: bool, message: String },
    NotApplicable { reason: &'static str },
}

impl SubmitOutcome {
    pub(crate) fn not_applicable(reason: &'static str) -> Self {
        SubmitOutcome::NotApplicable { reason }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, SubmitOutcome::Judged { correct: true, .. })
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, SubmitOutcome::Judged { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            SubmitOutcome::Judged { message, .. } => message,
            SubmitOutcome::NotApplicable { reason } => reason,
        }
    }
}

/// Uniform controller surface over the three steppers.
pub trait Stepper {
    type Value;
    type Comparison: fmt::Display;
    type Outcome;

    /// Advances one transition. Returns `false` once the run is terminal.
    fn step(&mut self) -> bool;

    /// True while the stepper is paused on a decision only `submit_side` resolves.
    fn awaiting_decision(&self) -> bool;

    /// Ground-truth answer for the pending decision.
    fn expected_side(&self) -> Option<Side>;

    fn submit_side(&mut self, side: Side) -> SubmitOutcome;

    fn peek_comparison(&self) -> Option<Self::Comparison>;

    fn tally(&self) -> DecisionTally;

    fn is_complete(&self) -> bool;

    fn outcome(&self) -> Option<Self::Outcome>;

    fn restart(&mut self);

    fn phase_name(&self) -> &'static str;

    fn input_len(&self) -> usize;
}

/// Drives `stepper` until it is terminal, asking `decide` for every pending
/// decision. Returns the outcome of each submission in order.
pub fn run_to_completion<S, F>(stepper: &mut S, mut decide: F) -> Vec<SubmitOutcome>
where
    S: Stepper + ?Sized,
    F: FnMut(&S) -> Side,
{
    let mut outcomes = Vec::new();
    loop {
        if stepper.awaiting_decision() {
            let side = decide(stepper);
            outcomes.push(stepper.submit_side(side));
        } else if !stepper.step() {
            break;
        }
    }
    outcomes
}

/// Decision strategy that always answers with the ground truth.
pub fn always_correct<S: Stepper + ?Sized>(stepper: &S) -> Side {
    stepper.expected_side().unwrap_or(Side::Left)
}

/// Decision strategy that always answers against the ground truth.
pub fn always_wrong<S: Stepper + ?Sized>(stepper: &S) -> Side {
    stepper.expected_side().unwrap_or(Side::Left).opposite()
}

/// Decision closure answering per `strategy`, counting turns from zero.
pub fn scripted<S: Stepper + ?Sized>(strategy: Strategy) -> impl FnMut(&S) -> Side {
    let mut turn = 0;
    move |stepper: &S| {
        let side = strategy.pick(stepper.expected_side(), turn);
        turn += 1;
        side
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
