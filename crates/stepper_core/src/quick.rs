use std::fmt;

use serde::Serialize;
use shared::{domain::Side, protocol::VisualEvent};
use tracing::{debug, warn};

use crate::{
    decision::{feedback, DecisionRecord, DecisionTally},
    sink::{Notifier, VisualSink},
    Stepper, SubmitOutcome,
};

const NOT_PARTITIONING: &str = "no element is waiting to be compared with the pivot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickPhase {
    Init,
    PivotChoice,
    Partition,
    Recurse,
    Done,
}

impl QuickPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            QuickPhase::Init => "init",
            QuickPhase::PivotChoice => "pivot_choice",
            QuickPhase::Partition => "partition",
            QuickPhase::Recurse => "recurse",
            QuickPhase::Done => "done",
        }
    }
}

/// Lomuto scan over `[lo, hi)` with the pivot parked at `hi`.
///
/// Everything in `[lo, boundary)` is `<=` the pivot; `scan` is the next
/// element to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scan {
    lo: usize,
    hi: usize,
    boundary: usize,
    scan: usize,
}

impl Scan {
    fn pending(&self) -> bool {
        self.scan < self.hi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    PivotChoice { lo: usize, hi: usize },
    Partition(Scan),
    Recurse { lo: usize, hi: usize, pivot_final: usize },
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuickHistory<T> {
    Pivot {
        lo: usize,
        hi: usize,
        pivot_index: usize,
        pivot_value: T,
    },
    Swap {
        first: usize,
        second: usize,
        array: Vec<T>,
    },
    Partition {
        lo: usize,
        hi: usize,
        pivot_final: usize,
        array: Vec<T>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickComparison<T> {
    pub index: usize,
    pub value: T,
    pub pivot: T,
}

impl<T: fmt::Display> fmt::Display for QuickComparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "element {} (at {}) vs pivot {}",
            self.value, self.index, self.pivot
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickStatistics {
    pub phase: QuickPhase,
    pub partitions: usize,
    pub max_stack_depth: usize,
    pub comparisons: usize,
    pub swaps: usize,
    pub correct_decisions: usize,
    pub precision: f64,
    pub pending_ranges: usize,
    pub complete: bool,
}

/// In-place quick sort over an explicit stack of `(lo, hi)` ranges.
///
/// The pivot is always the last element of the active range, so runs are
/// fully deterministic.
pub struct QuickStepper<T> {
    input: Vec<T>,
    array: Vec<T>,
    stack: Vec<(usize, usize)>,
    state: State,
    comparisons: usize,
    swaps: usize,
    correct: usize,
    partitions: usize,
    max_stack_depth: usize,
    decisions: Vec<DecisionRecord<T>>,
    history: Vec<QuickHistory<T>>,
    notifier: Notifier<T>,
}

fn initial_stack(len: usize) -> Vec<(usize, usize)> {
    if len >= 2 {
        vec![(0, len - 1)]
    } else {
        Vec::new()
    }
}

impl<T> QuickStepper<T>
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
        let stack = initial_stack(input.len());
        Self {
            input: input.to_vec(),
            array: input.to_vec(),
            max_stack_depth: stack.len(),
            stack,
            state: State::Init,
            comparisons: 0,
            swaps: 0,
            correct: 0,
            partitions: 0,
            decisions: Vec::new(),
            history: Vec::new(),
            notifier,
        }
    }

    /// Pops the next non-trivial range and parks its pivot. Only acts in `Init`.
    pub fn initialize(&mut self) {
        if self.state != State::Init {
            debug!(phase = self.phase().as_str(), "quick stepper not waiting for a range");
            return;
        }

        while let Some((lo, hi)) = self.stack.pop() {
            if lo < hi {
                self.state = State::PivotChoice { lo, hi };
                debug!(lo, hi, "quick partition range selected");
                self.notifier.emit(|| VisualEvent::PartitionInitialized {
                    array: self.array.clone(),
                    lo,
                    hi,
                    pivot_index: hi,
                });
                return;
            }
        }

        self.finish();
    }

    /// Advances one transition; returns `false` once sorted.
    ///
    /// While partitioning, each call classifies the next element without
    /// recording a decision.
    pub fn step(&mut self) -> bool {
        match self.state {
            State::Init => {
                self.initialize();
                self.state != State::Done
            }
            State::PivotChoice { lo, hi } => {
                self.begin_partition(lo, hi);
                true
            }
            State::Partition(scan) if scan.pending() => {
                self.notifier.emit(|| VisualEvent::ComparedWithPivot {
                    index: scan.scan,
                    value: self.array[scan.scan].clone(),
                    pivot_value: self.array[scan.hi].clone(),
                    boundary: scan.boundary,
                    array: self.array.clone(),
                });
                self.advance(scan);
                true
            }
            State::Partition(scan) => {
                if scan.boundary != scan.hi {
                    self.swap(scan.boundary, scan.hi);
                }
                self.state = State::Recurse {
                    lo: scan.lo,
                    hi: scan.hi,
                    pivot_final: scan.boundary,
                };
                true
            }
            State::Recurse {
                lo,
                hi,
                pivot_final,
            } => self.recurse(lo, hi, pivot_final),
            State::Done => false,
        }
    }

    fn begin_partition(&mut self, lo: usize, hi: usize) {
        self.state = State::Partition(Scan {
            lo,
            hi,
            boundary: lo,
            scan: lo,
        });
        let pivot_value = self.array[hi].clone();
        self.history.push(QuickHistory::Pivot {
            lo,
            hi,
            pivot_index: hi,
            pivot_value: pivot_value.clone(),
        });
        self.notifier.emit(|| VisualEvent::PivotChosen {
            pivot_index: hi,
            pivot_value,
            array: self.array.clone(),
        });
    }

    /// Classifies `array[scan]` against the pivot and moves the cursors.
    /// Identical whether or not a user judged the element.
    fn advance(&mut self, mut scan: Scan) -> Scan {
        self.comparisons += 1;
        if self.array[scan.scan] <= self.array[scan.hi] {
            if scan.boundary != scan.scan {
                self.swap(scan.boundary, scan.scan);
            }
            scan.boundary += 1;
        }
        scan.scan += 1;
        self.state = State::Partition(scan);
        scan
    }

    fn swap(&mut self, first: usize, second: usize) {
        self.array.swap(first, second);
        self.swaps += 1;
        self.history.push(QuickHistory::Swap {
            first,
            second,
            array: self.array.clone(),
        });
        self.notifier.emit(|| VisualEvent::SwapPerformed {
            first,
            second,
            array: self.array.clone(),
        });
    }

    fn recurse(&mut self, lo: usize, hi: usize, pivot_final: usize) -> bool {
        self.partitions += 1;
        self.history.push(QuickHistory::Partition {
            lo,
            hi,
            pivot_final,
            array: self.array.clone(),
        });

        if pivot_final + 1 < hi {
            self.stack.push((pivot_final + 1, hi));
        }
        if lo + 1 < pivot_final {
            self.stack.push((lo, pivot_final - 1));
        }
        self.max_stack_depth = self.max_stack_depth.max(self.stack.len());
        debug!(
            lo,
            hi,
            pivot_final,
            pending = self.stack.len(),
            "quick partition completed"
        );
        self.notifier.emit(|| VisualEvent::PartitionCompleted {
            pivot_final,
            array: self.array.clone(),
            pending_ranges: self.stack.len(),
        });

        if self.stack.is_empty() {
            self.finish();
            false
        } else {
            self.state = State::Init;
            true
        }
    }

    fn finish(&mut self) {
        self.state = State::Done;
        debug!(
            comparisons = self.comparisons,
            swaps = self.swaps,
            "quick sort finished"
        );
        self.notifier.emit(|| VisualEvent::SortCompleted {
            result: self.array.clone(),
        });
    }

    /// Judges whether the scanned element belongs left of the pivot
    /// (`element <= pivot`). The partition advances the same way either way.
    pub fn submit_decision(&mut self, belongs_left: bool) -> SubmitOutcome {
        let State::Partition(scan) = self.state else {
            warn!(belongs_left, "quick decision submitted outside a partition");
            return SubmitOutcome::not_applicable(NOT_PARTITIONING);
        };
        if !scan.pending() {
            return SubmitOutcome::not_applicable(NOT_PARTITIONING);
        }

        let value = self.array[scan.scan].clone();
        let pivot = self.array[scan.hi].clone();
        let expected = Side::from_left(value <= pivot);
        let relation = if expected.is_left() { "<=" } else { ">" };
        let message = feedback(
            Side::from_left(belongs_left) == expected,
            format!("{value} {relation} {pivot}"),
        );
        let record = DecisionRecord::judge(
            (value, pivot),
            Side::from_left(belongs_left),
            expected,
            self.partitions,
        );
        let correct = record.correct;
        if correct {
            self.correct += 1;
        }
        self.decisions.push(record);

        let scan = self.advance(scan);
        self.notifier.emit(|| VisualEvent::PartitionDecision {
            correct,
            message: message.clone(),
            array: self.array.clone(),
            boundary: scan.boundary,
            scan: scan.scan,
        });

        SubmitOutcome::Judged { correct, message }
    }

    pub fn peek_next_comparison(&self) -> Option<QuickComparison<T>> {
        match self.state {
            State::Partition(scan) if scan.pending() => Some(QuickComparison {
                index: scan.scan,
                value: self.array[scan.scan].clone(),
                pivot: self.array[scan.hi].clone(),
            }),
            _ => None,
        }
    }

    pub fn expected_side(&self) -> Option<Side> {
        match self.state {
            State::Partition(scan) if scan.pending() => {
                Some(Side::from_left(self.array[scan.scan] <= self.array[scan.hi]))
            }
            _ => None,
        }
    }

    pub fn phase(&self) -> QuickPhase {
        match self.state {
            State::Init => QuickPhase::Init,
            State::PivotChoice { .. } => QuickPhase::PivotChoice,
            State::Partition(_) => QuickPhase::Partition,
            State::Recurse { .. } => QuickPhase::Recurse,
            State::Done => QuickPhase::Done,
        }
    }

    /// `(lo, hi)` of the range being partitioned, if any.
    pub fn active_range(&self) -> Option<(usize, usize)> {
        match self.state {
            State::PivotChoice { lo, hi } | State::Recurse { lo, hi, .. } => Some((lo, hi)),
            State::Partition(scan) => Some((scan.lo, scan.hi)),
            State::Init | State::Done => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == State::Done
    }

    pub fn statistics(&self) -> QuickStatistics {
        let tally = DecisionTally::from_records(&self.decisions);
        QuickStatistics {
            phase: self.phase(),
            partitions: self.partitions,
            max_stack_depth: self.max_stack_depth,
            comparisons: self.comparisons,
            swaps: self.swaps,
            correct_decisions: self.correct,
            precision: tally.precision(),
            pending_ranges: self.stack.len(),
            complete: self.is_complete(),
        }
    }

    pub fn final_result(&self) -> Option<Vec<T>> {
        self.is_complete().then(|| self.array.clone())
    }

    /// Discards all progress and returns to `Init`. The sink stays registered.
    pub fn restart(&mut self) {
        self.array = self.input.clone();
        self.stack = initial_stack(self.input.len());
        self.max_stack_depth = self.stack.len();
        self.state = State::Init;
        self.comparisons = 0;
        self.swaps = 0;
        self.correct = 0;
        self.partitions = 0;
        self.decisions.clear();
        self.history.clear();
    }

    pub fn input(&self) -> &[T] {
        &self.input
    }

    pub fn array(&self) -> &[T] {
        &self.array
    }

    pub fn pending_ranges(&self) -> &[(usize, usize)] {
        &self.stack
    }

    pub fn decisions(&self) -> &[DecisionRecord<T>] {
        &self.decisions
    }

    pub fn history(&self) -> &[QuickHistory<T>] {
        &self.history
    }
}

impl<T> Stepper for QuickStepper<T>
where
    T: Ord + Clone + fmt::Display,
{
    type Value = T;
    type Comparison = QuickComparison<T>;
    type Outcome = Vec<T>;

    fn step(&mut self) -> bool {
        QuickStepper::step(self)
    }

    fn awaiting_decision(&self) -> bool {
        matches!(self.state, State::Partition(scan) if scan.pending())
    }

    fn expected_side(&self) -> Option<Side> {
        QuickStepper::expected_side(self)
    }

    fn submit_side(&mut self, side: Side) -> SubmitOutcome {
        self.submit_decision(side.is_left())
    }

    fn peek_comparison(&self) -> Option<Self::Comparison> {
        self.peek_next_comparison()
    }

    fn tally(&self) -> DecisionTally {
        DecisionTally::from_records(&self.decisions)
    }

    fn is_complete(&self) -> bool {
        QuickStepper::is_complete(self)
    }

    fn outcome(&self) -> Option<Self::Outcome> {
        self.final_result()
    }

    fn restart(&mut self) {
        QuickStepper::restart(self)
    }

    fn phase_name(&self) -> &'static str {
        self.phase().as_str()
    }

    fn input_len(&self) -> usize {
        self.input.len()
    }
}

#[cfg(test)]
#[path = "tests/quick_tests.rs"]
mod tests;
