use std::{fmt, mem};

use serde::Serialize;
use shared::{domain::Side, protocol::VisualEvent};
use tracing::{debug, warn};

use crate::{
    decision::{feedback, percentage, DecisionRecord, DecisionTally},
    sink::{Notifier, VisualSink},
    Stepper, SubmitOutcome,
};

const NOT_FUSING: &str = "no fusion is waiting for a choice";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePhase {
    Init,
    Divide,
    Conquer,
    Fuse,
    Done,
}

impl MergePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            MergePhase::Init => "init",
            MergePhase::Divide => "divide",
            MergePhase::Conquer => "conquer",
            MergePhase::Fuse => "fuse",
            MergePhase::Done => "done",
        }
    }
}

/// Two sorted runs being merged, with a read cursor into each.
#[derive(Debug, Clone)]
struct Fusion<T> {
    left: Vec<T>,
    right: Vec<T>,
    left_cursor: usize,
    right_cursor: usize,
    merged: Vec<T>,
}

impl<T: Clone> Fusion<T> {
    fn new(left: Vec<T>, right: Vec<T>) -> Self {
        let capacity = left.len() + right.len();
        Self {
            left,
            right,
            left_cursor: 0,
            right_cursor: 0,
            merged: Vec::with_capacity(capacity),
        }
    }

    /// Front elements of both runs, or `None` once either run is exhausted.
    fn heads(&self) -> Option<(&T, &T)> {
        Some((
            self.left.get(self.left_cursor)?,
            self.right.get(self.right_cursor)?,
        ))
    }

    fn take(&mut self, side: Side) -> T {
        let value = match side {
            Side::Left => {
                self.left_cursor += 1;
                self.left[self.left_cursor - 1].clone()
            }
            Side::Right => {
                self.right_cursor += 1;
                self.right[self.right_cursor - 1].clone()
            }
        };
        self.merged.push(value.clone());
        value
    }

    fn drain_remainder(&mut self) {
        self.merged.extend_from_slice(&self.left[self.left_cursor..]);
        self.merged.extend_from_slice(&self.right[self.right_cursor..]);
        self.left_cursor = self.left.len();
        self.right_cursor = self.right.len();
    }
}

enum State<T> {
    Init,
    Divide,
    Conquer,
    Fuse(Fusion<T>),
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeHistory<T> {
    Division {
        level: usize,
        sublists: Vec<Vec<T>>,
    },
    Fusion {
        level: usize,
        left: Vec<T>,
        right: Vec<T>,
        merged: Vec<T>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeComparison<T> {
    pub left: T,
    pub right: T,
}

impl<T: fmt::Display> fmt::Display for MergeComparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "left {} | right {}", self.left, self.right)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeStatistics {
    pub phase: MergePhase,
    pub level: usize,
    pub fusions: usize,
    pub comparisons: usize,
    pub correct_decisions: usize,
    pub precision: f64,
    pub remaining_elements: usize,
    pub remaining_sublists: usize,
    pub progress: f64,
    pub complete: bool,
}

/// Merge sort driven one comparison at a time.
///
/// The input is split into singleton runs, then adjacent runs are fused
/// level by level. Within a level the pair at `pair` is the next to fuse;
/// an odd trailing run is carried to the next level untouched.
pub struct MergeStepper<T> {
    input: Vec<T>,
    state: State<T>,
    sublists: Vec<Vec<T>>,
    level: usize,
    pair: usize,
    fusions: usize,
    comparisons: usize,
    correct: usize,
    decisions: Vec<DecisionRecord<T>>,
    history: Vec<MergeHistory<T>>,
    notifier: Notifier<T>,
}

impl<T> MergeStepper<T>
where
    T: Ord + Clone + fmt::Display,
{
    pub fn new(input: &[T]) -> Self {
        Self::with_notifier(input, Notifier::silent())
    }

    pub fn with_sink(input: &[T], sink: impl VisualSink<T> + 'static) -> Self {
        Self::with_notifier(input, Notifier::new(Box::new(sink)))
    }

    fn with_notifier(input: &[T], notifier: Notifier<T>) -> Self {
        Self {
            input: input.to_vec(),
            state: State::Init,
            sublists: Vec::new(),
            level: 0,
            pair: 0,
            fusions: 0,
            comparisons: 0,
            correct: 0,
            decisions: Vec::new(),
            history: Vec::new(),
            notifier,
        }
    }

    /// Splits the input into singleton runs. Only acts in `Init`.
    pub fn initialize(&mut self) {
        if !matches!(self.state, State::Init) {
            debug!(phase = self.phase().as_str(), "merge stepper already initialized");
            return;
        }

        self.sublists = self.input.iter().cloned().map(|value| vec![value]).collect();
        self.level = 0;
        self.pair = 0;
        self.state = State::Divide;
        self.history.push(MergeHistory::Division {
            level: 0,
            sublists: self.sublists.clone(),
        });
        debug!(elements = self.input.len(), "merge stepper divided input");
        self.notifier.emit(|| VisualEvent::DivisionInitial {
            sublists: self.sublists.clone(),
            level: self.level,
        });
    }

    /// Advances one transition; returns `false` once sorted.
    pub fn step(&mut self) -> bool {
        match &self.state {
            State::Init => {
                self.initialize();
                true
            }
            State::Divide => {
                if self.sublists.len() <= 1 {
                    self.finish();
                    false
                } else {
                    self.state = State::Conquer;
                    true
                }
            }
            State::Conquer => self.conquer(),
            State::Fuse(fusion) => {
                if fusion.heads().is_none() {
                    self.finalize_fusion();
                }
                true
            }
            State::Done => false,
        }
    }

    fn conquer(&mut self) -> bool {
        if self.pair + 1 >= self.sublists.len() {
            self.level += 1;
            self.pair = 0;
            if self.sublists.len() <= 1 {
                self.finish();
                return false;
            }
            debug!(
                level = self.level,
                sublists = self.sublists.len(),
                "merge level advanced"
            );
            self.notifier.emit(|| VisualEvent::LevelAdvanced {
                level: self.level,
                sublists: self.sublists.clone(),
            });
            return true;
        }

        let fusion = Fusion::new(
            self.sublists[self.pair].clone(),
            self.sublists[self.pair + 1].clone(),
        );
        self.notifier.emit(|| VisualEvent::FusionStarted {
            left: fusion.left.clone(),
            right: fusion.right.clone(),
            level: self.level,
        });
        self.state = State::Fuse(fusion);
        true
    }

    /// Judges a choice between the two run heads.
    ///
    /// The left head wins ties. The winning element is appended whatever the
    /// caller chose; the choice is only scored.
    pub fn submit_choice(&mut self, choose_left: bool) -> SubmitOutcome {
        let State::Fuse(fusion) = &mut self.state else {
            warn!(choose_left, "merge choice submitted outside a fusion");
            return SubmitOutcome::not_applicable(NOT_FUSING);
        };
        let Some((left, right)) = fusion.heads() else {
            return SubmitOutcome::not_applicable(NOT_FUSING);
        };
        let (left, right) = (left.clone(), right.clone());

        let expected = Side::from_left(left <= right);
        let record = DecisionRecord::judge(
            (left.clone(), right.clone()),
            Side::from_left(choose_left),
            expected,
            self.level,
        );
        let correct = record.correct;
        let chosen = fusion.take(expected);

        self.comparisons += 1;
        if correct {
            self.correct += 1;
        }
        let message = match expected {
            Side::Left => feedback(correct, format!("{left} comes before {right}")),
            Side::Right => feedback(correct, format!("{right} comes before {left}")),
        };
        self.decisions.push(record);

        let exhausted = fusion.heads().is_none();
        self.notifier.emit(|| VisualEvent::ChoiceMade {
            correct,
            message: message.clone(),
            partial: fusion.merged.clone(),
            chosen,
        });

        if exhausted {
            self.finalize_fusion();
        }

        SubmitOutcome::Judged { correct, message }
    }

    fn finalize_fusion(&mut self) {
        let State::Fuse(mut fusion) = mem::replace(&mut self.state, State::Conquer) else {
            return;
        };
        fusion.drain_remainder();
        let Fusion {
            left,
            right,
            merged,
            ..
        } = fusion;

        self.sublists[self.pair] = merged.clone();
        self.sublists.remove(self.pair + 1);
        self.fusions += 1;
        self.pair += 1;
        debug!(
            level = self.level,
            fusions = self.fusions,
            merged_len = merged.len(),
            "merge fusion completed"
        );

        self.notifier.emit(|| VisualEvent::FusionCompleted {
            merged: merged.clone(),
            sublists: self.sublists.clone(),
            level: self.level,
        });
        self.history.push(MergeHistory::Fusion {
            level: self.level,
            left,
            right,
            merged,
        });
    }

    fn finish(&mut self) {
        self.state = State::Done;
        debug!(
            comparisons = self.comparisons,
            correct = self.correct,
            "merge sort finished"
        );
        self.notifier.emit(|| VisualEvent::SortCompleted {
            result: self.sublists.first().cloned().unwrap_or_default(),
        });
    }

    pub fn peek_next_comparison(&self) -> Option<MergeComparison<T>> {
        match &self.state {
            State::Fuse(fusion) => fusion.heads().map(|(left, right)| MergeComparison {
                left: left.clone(),
                right: right.clone(),
            }),
            _ => None,
        }
    }

    pub fn expected_side(&self) -> Option<Side> {
        match &self.state {
            State::Fuse(fusion) => fusion
                .heads()
                .map(|(left, right)| Side::from_left(left <= right)),
            _ => None,
        }
    }

    pub fn phase(&self) -> MergePhase {
        match self.state {
            State::Init => MergePhase::Init,
            State::Divide => MergePhase::Divide,
            State::Conquer => MergePhase::Conquer,
            State::Fuse(_) => MergePhase::Fuse,
            State::Done => MergePhase::Done,
        }
    }

    pub fn is_complete(&self) -> bool {
        !matches!(self.state, State::Init) && self.sublists.len() <= 1
    }

    /// Fraction of the fusions needed to sort the input that are done.
    pub fn progress(&self) -> f64 {
        if self.is_complete() {
            return 100.0;
        }
        let total = self.input.len();
        if self.sublists.is_empty() || total <= 1 {
            return 0.0;
        }
        percentage(total - self.sublists.len(), total - 1)
    }

    pub fn statistics(&self) -> MergeStatistics {
        MergeStatistics {
            phase: self.phase(),
            level: self.level,
            fusions: self.fusions,
            comparisons: self.comparisons,
            correct_decisions: self.correct,
            precision: percentage(self.correct, self.comparisons),
            remaining_elements: self.sublists.iter().map(Vec::len).sum(),
            remaining_sublists: self.sublists.len(),
            progress: self.progress(),
            complete: self.is_complete(),
        }
    }

    pub fn final_result(&self) -> Option<Vec<T>> {
        self.is_complete()
            .then(|| self.sublists.first().cloned().unwrap_or_default())
    }

    /// Discards all progress and returns to `Init`. The sink stays registered.
    pub fn restart(&mut self) {
        self.state = State::Init;
        self.sublists.clear();
        self.level = 0;
        self.pair = 0;
        self.fusions = 0;
        self.comparisons = 0;
        self.correct = 0;
        self.decisions.clear();
        self.history.clear();
    }

    pub fn input(&self) -> &[T] {
        &self.input
    }

    pub fn sublists(&self) -> &[Vec<T>] {
        &self.sublists
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Partially merged output of the active fusion.
    pub fn partial_fusion(&self) -> Option<&[T]> {
        match &self.state {
            State::Fuse(fusion) => Some(&fusion.merged),
            _ => None,
        }
    }

    pub fn decisions(&self) -> &[DecisionRecord<T>] {
        &self.decisions
    }

    pub fn history(&self) -> &[MergeHistory<T>] {
        &self.history
    }
}

impl<T> Stepper for MergeStepper<T>
where
    T: Ord + Clone + fmt::Display,
{
    type Value = T;
    type Comparison = MergeComparison<T>;
    type Outcome = Vec<T>;

    fn step(&mut self) -> bool {
        MergeStepper::step(self)
    }

    fn awaiting_decision(&self) -> bool {
        self.expected_side().is_some()
    }

    fn expected_side(&self) -> Option<Side> {
        MergeStepper::expected_side(self)
    }

    fn submit_side(&mut self, side: Side) -> SubmitOutcome {
        self.submit_choice(side.is_left())
    }

    fn peek_comparison(&self) -> Option<Self::Comparison> {
        self.peek_next_comparison()
    }

    fn tally(&self) -> DecisionTally {
        DecisionTally::from_records(&self.decisions)
    }

    fn is_complete(&self) -> bool {
        MergeStepper::is_complete(self)
    }

    fn outcome(&self) -> Option<Self::Outcome> {
        self.final_result()
    }

    fn restart(&mut self) {
        MergeStepper::restart(self)
    }

    fn phase_name(&self) -> &'static str {
        self.phase().as_str()
    }

    fn input_len(&self) -> usize {
        self.input.len()
    }
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
