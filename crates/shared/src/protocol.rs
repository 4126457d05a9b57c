use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Algorithm, Level, RunId};

/// Notifications a stepper pushes to its registered visual sink.
///
/// Search intervals are half-open: `[lo, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum VisualEvent<T> {
    DivisionInitial {
        sublists: Vec<Vec<T>>,
        level: usize,
    },
    FusionStarted {
        left: Vec<T>,
        right: Vec<T>,
        level: usize,
    },
    ChoiceMade {
        correct: bool,
        message: String,
        partial: Vec<T>,
        chosen: T,
    },
    FusionCompleted {
        merged: Vec<T>,
        sublists: Vec<Vec<T>>,
        level: usize,
    },
    LevelAdvanced {
        level: usize,
        sublists: Vec<Vec<T>>,
    },
    PartitionInitialized {
        array: Vec<T>,
        lo: usize,
        hi: usize,
        pivot_index: usize,
    },
    PivotChosen {
        pivot_index: usize,
        pivot_value: T,
        array: Vec<T>,
    },
    ComparedWithPivot {
        index: usize,
        value: T,
        pivot_value: T,
        boundary: usize,
        array: Vec<T>,
    },
    SwapPerformed {
        first: usize,
        second: usize,
        array: Vec<T>,
    },
    PartitionDecision {
        correct: bool,
        message: String,
        array: Vec<T>,
        boundary: usize,
        scan: usize,
    },
    PartitionCompleted {
        pivot_final: usize,
        array: Vec<T>,
        pending_ranges: usize,
    },
    SearchInitialized {
        array: Vec<T>,
        target: T,
        lo: usize,
        end: usize,
    },
    NewIteration {
        lo: usize,
        end: usize,
        mid: usize,
        mid_value: T,
        target: T,
        iteration: usize,
    },
    DirectionDecision {
        correct: bool,
        message: String,
        lo: usize,
        end: usize,
        mid_value: T,
    },
    ValueFound {
        position: usize,
        value: T,
        iterations: usize,
    },
    ValueNotFound {
        target: T,
        iterations: usize,
    },
    SortCompleted {
        result: Vec<T>,
    },
}

impl<T> VisualEvent<T> {
    /// Stable snake_case name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            VisualEvent::DivisionInitial { .. } => "division_initial",
            VisualEvent::FusionStarted { .. } => "fusion_started",
            VisualEvent::ChoiceMade { .. } => "choice_made",
            VisualEvent::FusionCompleted { .. } => "fusion_completed",
            VisualEvent::LevelAdvanced { .. } => "level_advanced",
            VisualEvent::PartitionInitialized { .. } => "partition_initialized",
            VisualEvent::PivotChosen { .. } => "pivot_chosen",
            VisualEvent::ComparedWithPivot { .. } => "compared_with_pivot",
            VisualEvent::SwapPerformed { .. } => "swap_performed",
            VisualEvent::PartitionDecision { .. } => "partition_decision",
            VisualEvent::PartitionCompleted { .. } => "partition_completed",
            VisualEvent::SearchInitialized { .. } => "search_initialized",
            VisualEvent::NewIteration { .. } => "new_iteration",
            VisualEvent::DirectionDecision { .. } => "direction_decision",
            VisualEvent::ValueFound { .. } => "value_found",
            VisualEvent::ValueNotFound { .. } => "value_not_found",
            VisualEvent::SortCompleted { .. } => "sort_completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VisualEvent::SortCompleted { .. }
                | VisualEvent::ValueFound { .. }
                | VisualEvent::ValueNotFound { .. }
        )
    }
}

/// One finished (or abandoned) session, as written to the run history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub algorithm: Algorithm,
    pub level: Level,
    pub elements: usize,
    pub elapsed_secs: f64,
    pub correct: u32,
    pub incorrect: u32,
    pub score: u64,
    pub recorded_at: DateTime<Utc>,
    pub completed: bool,
}

impl RunSummary {
    pub fn precision(&self) -> f64 {
        let total = self.correct + self.incorrect;
        if total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(total) * 100.0
        }
    }

    pub fn points_per_second(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.score as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}
