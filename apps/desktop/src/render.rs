use std::fmt::{self, Display};

use shared::protocol::VisualEvent;

/// One-line description of a stepper event. Decision events return `None`:
/// the session prints their feedback together with the points awarded.
pub fn describe<T: Display>(event: &VisualEvent<T>) -> Option<String> {
    let line = match event {
        VisualEvent::DivisionInitial { sublists, .. } => {
            format!("divided into {}", lists(sublists))
        }
        VisualEvent::FusionStarted { left, right, level } => {
            format!("level {level}: merging {} with {}", list(left), list(right))
        }
        VisualEvent::FusionCompleted { merged, .. } => format!("merged {}", list(merged)),
        VisualEvent::LevelAdvanced { level, sublists } => {
            format!("level {level}: {}", lists(sublists))
        }
        VisualEvent::PartitionInitialized { array, lo, hi, .. } => {
            format!("partitioning [{lo}..={hi}] of {}", list(array))
        }
        VisualEvent::PivotChosen {
            pivot_index,
            pivot_value,
            ..
        } => format!("pivot {pivot_value} at {pivot_index}"),
        VisualEvent::ComparedWithPivot {
            value, pivot_value, ..
        } => format!("compared {value} with pivot {pivot_value}"),
        VisualEvent::SwapPerformed {
            first,
            second,
            array,
        } => format!("swapped {first} and {second}: {}", list(array)),
        VisualEvent::PartitionCompleted {
            pivot_final,
            array,
            pending_ranges,
        } => format!(
            "pivot settled at {pivot_final}: {} ({pending_ranges} ranges left)",
            list(array)
        ),
        VisualEvent::SearchInitialized { array, target, .. } => {
            format!("searching {} for {target}", list(array))
        }
        VisualEvent::NewIteration {
            lo,
            end,
            mid,
            mid_value,
            iteration,
            ..
        } => format!("iteration {iteration}: [{lo}, {end}) middle {mid_value} at {mid}"),
        VisualEvent::ValueFound {
            position,
            value,
            iterations,
        } => format!("found {value} at {position} after {iterations} iterations"),
        VisualEvent::ValueNotFound { target, iterations } => {
            format!("{target} is not present ({iterations} iterations)")
        }
        VisualEvent::SortCompleted { result } => format!("sorted: {}", list(result)),
        VisualEvent::ChoiceMade { .. }
        | VisualEvent::PartitionDecision { .. }
        | VisualEvent::DirectionDecision { .. } => return None,
    };
    Some(line)
}

struct List<'a, T>(&'a [T]);

impl<T: Display> Display for List<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            value.fmt(f)?;
        }
        f.write_str("]")
    }
}

fn list<T: Display>(values: &[T]) -> String {
    List(values).to_string()
}

fn lists<T: Display>(sublists: &[Vec<T>]) -> String {
    sublists
        .iter()
        .map(|sublist| list(sublist))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_progress_events() {
        let event = VisualEvent::FusionStarted {
            left: vec![3, 5],
            right: vec![1, 8],
            level: 1,
        };
        assert_eq!(
            describe(&event).as_deref(),
            Some("level 1: merging [3, 5] with [1, 8]")
        );

        let event = VisualEvent::DivisionInitial {
            sublists: vec![vec![5], vec![3]],
            level: 0,
        };
        assert_eq!(describe(&event).as_deref(), Some("divided into [5] [3]"));
    }

    #[test]
    fn decision_events_are_left_to_the_session() {
        let event = VisualEvent::DirectionDecision {
            correct: true,
            message: "Correct! 7 > 5, search right".to_string(),
            lo: 3,
            end: 6,
            mid_value: 5,
        };
        assert_eq!(describe(&event), None);
    }
}
