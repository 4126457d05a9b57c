use std::fmt;

use serde::Serialize;
use shared::{domain::Side, protocol::VisualEvent};
use tracing::{debug, warn};

use crate::{
    decision::{feedback, percentage, DecisionRecord, DecisionTally},
    sink::{Notifier, VisualSink},
    Stepper, SubmitOutcome,
};

const NO_PENDING_MIDPOINT: &str = "no midpoint is waiting for a direction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Init,
    Searching,
    Found,
    NotFound,
}

impl SearchPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchPhase::Init => "init",
            SearchPhase::Searching => "searching",
            SearchPhase::Found => "found",
            SearchPhase::NotFound => "not_found",
        }
    }
}

/// Candidate interval is `[lo, end)`. `pending` holds the midpoint of the
/// current iteration until a direction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Searching {
        lo: usize,
        end: usize,
        pending: Option<usize>,
    },
    Found {
        position: usize,
    },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalSnapshot<T> {
    pub lo: usize,
    pub end: usize,
    pub mid: Option<usize>,
    pub mid_value: Option<T>,
    pub iteration: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchComparison<T> {
    pub mid: usize,
    pub mid_value: T,
    pub target: T,
}

impl<T: fmt::Display> fmt::Display for SearchComparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "target {} vs middle {} (at {})",
            self.target, self.mid_value, self.mid
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome<T> {
    pub found: bool,
    pub position: Option<usize>,
    pub target: T,
    pub iterations: usize,
    pub history: Vec<IntervalSnapshot<T>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStatistics {
    pub phase: SearchPhase,
    pub iterations: usize,
    pub comparisons: usize,
    pub correct_decisions: usize,
    pub precision: f64,
    pub theoretical_complexity: usize,
    pub efficiency: f64,
    pub found: bool,
    pub position: Option<usize>,
    pub complete: bool,
}

/// `ceil(log2(n))`, and 0 for an empty or single-element input.
pub fn theoretical_complexity(len: usize) -> usize {
    len.saturating_sub(1)
        .checked_ilog2()
        .map_or(0, |bits| bits as usize + 1)
}

/// Binary search where the caller predicts which half holds the target.
///
/// The input is expected to be sorted ascending; it is not re-sorted.
pub struct SearchStepper<T> {
    input: Vec<T>,
    target: T,
    state: State,
    iterations: usize,
    comparisons: usize,
    correct: usize,
    decisions: Vec<DecisionRecord<T>>,
    history: Vec<IntervalSnapshot<T>>,
    notifier: Notifier<T>,
}

impl<T> SearchStepper<T>
where
    T: Ord + Clone + fmt::Display,
{
    pub fn new(sorted: &[T], target: T) -> Self {
        Self::with_notifier(sorted, target, Notifier::silent())
    }

    pub fn with_sink(sorted: &[T], target: T, sink: impl VisualSink<T> + 'static) -> Self {
        Self::with_notifier(sorted, target, Notifier::new(Box::new(sink)))
    }

    fn with_notifier(sorted: &[T], target: T, notifier: Notifier<T>) -> Self {
        if !sorted.windows(2).all(|pair| pair[0] <= pair[1]) {
            warn!(len = sorted.len(), "binary search input is not sorted ascending");
        }
        Self {
            input: sorted.to_vec(),
            target,
            state: State::Init,
            iterations: 0,
            comparisons: 0,
            correct: 0,
            decisions: Vec::new(),
            history: Vec::new(),
            notifier,
        }
    }

    /// Opens the full interval. An empty input goes straight to `NotFound`.
    /// Only acts in `Init`.
    pub fn initialize(&mut self) {
        if self.state != State::Init {
            debug!(phase = self.phase().as_str(), "search stepper already initialized");
            return;
        }

        let end = self.input.len();
        self.state = State::Searching {
            lo: 0,
            end,
            pending: None,
        };
        self.history.push(IntervalSnapshot {
            lo: 0,
            end,
            mid: None,
            mid_value: None,
            iteration: 0,
        });
        self.notifier.emit(|| VisualEvent::SearchInitialized {
            array: self.input.clone(),
            target: self.target.clone(),
            lo: 0,
            end,
        });

        if end == 0 {
            self.not_found();
        }
    }

    /// Advances one transition; returns `false` once found or exhausted.
    ///
    /// With a midpoint pending, the interval is narrowed by ground truth and
    /// no decision is recorded.
    pub fn step(&mut self) -> bool {
        match self.state {
            State::Init => {
                self.initialize();
                !self.is_complete()
            }
            State::Searching { lo, end, .. } if lo >= end => {
                self.not_found();
                false
            }
            State::Searching {
                lo,
                end,
                pending: None,
            } => self.iterate(lo, end),
            State::Searching {
                lo,
                end,
                pending: Some(mid),
            } => {
                self.narrow(lo, end, mid);
                true
            }
            State::Found { .. } | State::NotFound => false,
        }
    }

    fn iterate(&mut self, lo: usize, end: usize) -> bool {
        let mid = (lo + end - 1) / 2;
        self.iterations += 1;
        self.comparisons += 1;

        let mid_value = self.input[mid].clone();
        self.history.push(IntervalSnapshot {
            lo,
            end,
            mid: Some(mid),
            mid_value: Some(mid_value.clone()),
            iteration: self.iterations,
        });
        debug!(lo, end, mid, iteration = self.iterations, "binary search iteration");
        self.notifier.emit(|| VisualEvent::NewIteration {
            lo,
            end,
            mid,
            mid_value: mid_value.clone(),
            target: self.target.clone(),
            iteration: self.iterations,
        });

        if mid_value == self.target {
            self.state = State::Found { position: mid };
            debug!(position = mid, iterations = self.iterations, "binary search found target");
            self.notifier.emit(|| VisualEvent::ValueFound {
                position: mid,
                value: mid_value,
                iterations: self.iterations,
            });
            return false;
        }

        self.state = State::Searching {
            lo,
            end,
            pending: Some(mid),
        };
        true
    }

    /// Drops the half that cannot hold the target.
    fn narrow(&mut self, lo: usize, end: usize, mid: usize) -> (usize, usize) {
        let (lo, end) = if self.target < self.input[mid] {
            (lo, mid)
        } else {
            (mid + 1, end)
        };
        self.state = State::Searching {
            lo,
            end,
            pending: None,
        };
        (lo, end)
    }

    fn not_found(&mut self) {
        self.state = State::NotFound;
        debug!(iterations = self.iterations, "binary search exhausted interval");
        self.notifier.emit(|| VisualEvent::ValueNotFound {
            target: self.target.clone(),
            iterations: self.iterations,
        });
    }

    /// Judges the predicted half. The interval shrinks by ground truth
    /// whatever the caller chose.
    pub fn submit_direction(&mut self, search_left: bool) -> SubmitOutcome {
        let State::Searching {
            lo,
            end,
            pending: Some(mid),
        } = self.state
        else {
            warn!(search_left, "search direction submitted without a pending midpoint");
            return SubmitOutcome::not_applicable(NO_PENDING_MIDPOINT);
        };

        let mid_value = self.input[mid].clone();
        let expected = Side::from_left(self.target < mid_value);
        let detail = match expected {
            Side::Left => format!("{} < {mid_value}, search left", self.target),
            Side::Right => format!("{} > {mid_value}, search right", self.target),
        };
        let record = DecisionRecord::judge(
            (mid_value.clone(), self.target.clone()),
            Side::from_left(search_left),
            expected,
            self.iterations,
        );
        let correct = record.correct;
        let message = feedback(correct, detail);
        if correct {
            self.correct += 1;
        }
        self.decisions.push(record);

        let (lo, end) = self.narrow(lo, end, mid);
        self.notifier.emit(|| VisualEvent::DirectionDecision {
            correct,
            message: message.clone(),
            lo,
            end,
            mid_value,
        });

        SubmitOutcome::Judged { correct, message }
    }

    pub fn peek_next_comparison(&self) -> Option<SearchComparison<T>> {
        match self.state {
            State::Searching { lo, end, pending } if lo < end => {
                let mid = pending.unwrap_or((lo + end - 1) / 2);
                Some(SearchComparison {
                    mid,
                    mid_value: self.input[mid].clone(),
                    target: self.target.clone(),
                })
            }
            _ => None,
        }
    }

    pub fn expected_side(&self) -> Option<Side> {
        match self.state {
            State::Searching {
                pending: Some(mid), ..
            } => Some(Side::from_left(self.target < self.input[mid])),
            _ => None,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        match self.state {
            State::Init => SearchPhase::Init,
            State::Searching { .. } => SearchPhase::Searching,
            State::Found { .. } => SearchPhase::Found,
            State::NotFound => SearchPhase::NotFound,
        }
    }

    /// Current candidate interval as `[lo, end)`.
    pub fn interval(&self) -> Option<(usize, usize)> {
        match self.state {
            State::Searching { lo, end, .. } => Some((lo, end)),
            _ => None,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self.state {
            State::Found { position } => Some(position),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Found { .. } | State::NotFound)
    }

    pub fn statistics(&self) -> SearchStatistics {
        let tally = DecisionTally::from_records(&self.decisions);
        let theoretical = theoretical_complexity(self.input.len());
        SearchStatistics {
            phase: self.phase(),
            iterations: self.iterations,
            comparisons: self.comparisons,
            correct_decisions: self.correct,
            precision: tally.precision(),
            theoretical_complexity: theoretical,
            efficiency: percentage(theoretical, self.iterations.max(1)),
            found: self.position().is_some(),
            position: self.position(),
            complete: self.is_complete(),
        }
    }

    pub fn final_result(&self) -> Option<SearchOutcome<T>> {
        self.is_complete().then(|| SearchOutcome {
            found: self.position().is_some(),
            position: self.position(),
            target: self.target.clone(),
            iterations: self.iterations,
            history: self.history.clone(),
        })
    }

    /// Discards all progress and returns to `Init`. The sink stays registered.
    pub fn restart(&mut self) {
        self.state = State::Init;
        self.iterations = 0;
        self.comparisons = 0;
        self.correct = 0;
        self.decisions.clear();
        self.history.clear();
    }

    pub fn restart_with_target(&mut self, target: T) {
        self.target = target;
        self.restart();
    }

    pub fn input(&self) -> &[T] {
        &self.input
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn decisions(&self) -> &[DecisionRecord<T>] {
        &self.decisions
    }

    pub fn history(&self) -> &[IntervalSnapshot<T>] {
        &self.history
    }
}

impl<T> Stepper for SearchStepper<T>
where
    T: Ord + Clone + fmt::Display,
{
    type Value = T;
    type Comparison = SearchComparison<T>;
    type Outcome = SearchOutcome<T>;

    fn step(&mut self) -> bool {
        SearchStepper::step(self)
    }

    fn awaiting_decision(&self) -> bool {
        matches!(
            self.state,
            State::Searching {
                pending: Some(_),
                ..
            }
        )
    }

    fn expected_side(&self) -> Option<Side> {
        SearchStepper::expected_side(self)
    }

    fn submit_side(&mut self, side: Side) -> SubmitOutcome {
        self.submit_direction(side.is_left())
    }

    fn peek_comparison(&self) -> Option<Self::Comparison> {
        self.peek_next_comparison()
    }

    fn tally(&self) -> DecisionTally {
        DecisionTally::from_records(&self.decisions)
    }

    fn is_complete(&self) -> bool {
        SearchStepper::is_complete(self)
    }

    fn outcome(&self) -> Option<Self::Outcome> {
        self.final_result()
    }

    fn restart(&mut self) {
        SearchStepper::restart(self)
    }

    fn phase_name(&self) -> &'static str {
        self.phase().as_str()
    }

    fn input_len(&self) -> usize {
        self.input.len()
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
