use rand::{seq::SliceRandom, Rng};
use shared::{domain::Algorithm, error::GameError};

/// Values and (for binary search) the target a session starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub values: Vec<i64>,
    pub target: Option<i64>,
}

/// `count` distinct values drawn uniformly from `[min, max)`.
pub fn random_values<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    min: i64,
    max: i64,
) -> Result<Vec<i64>, GameError> {
    let span = max.saturating_sub(min);
    if span <= 0 || (span as u64) < count as u64 {
        return Err(GameError::RangeTooSmall {
            min,
            max,
            requested: count,
        });
    }

    Ok(rand::seq::index::sample(rng, span as usize, count)
        .into_iter()
        .map(|offset| min + offset as i64)
        .collect())
}

const ABSENT_DRAWS: usize = 32;

/// Picks a value of `sorted`, or one outside it when `absent` is set.
pub fn search_target<R: Rng + ?Sized>(
    rng: &mut R,
    sorted: &[i64],
    absent: bool,
    min: i64,
    max: i64,
) -> i64 {
    if !absent {
        if let Some(value) = sorted.choose(rng) {
            return *value;
        }
    }

    let is_missing = |value: &i64| sorted.binary_search(value).is_err();
    if min < max {
        for _ in 0..ABSENT_DRAWS {
            let candidate = rng.gen_range(min..max);
            if is_missing(&candidate) {
                return candidate;
            }
        }
    }

    // a gap shows up within the first `sorted.len() + 1` values of the range
    (min..max)
        .take(sorted.len() + 1)
        .find(is_missing)
        .unwrap_or_else(|| sorted.last().map_or(min, |last| last.saturating_add(1)))
}

/// Binary search sessions get their values sorted and a target chosen.
pub fn prepare<R: Rng + ?Sized>(
    rng: &mut R,
    algorithm: Algorithm,
    mut values: Vec<i64>,
    target: Option<i64>,
    absent: bool,
    (min, max): (i64, i64),
) -> Puzzle {
    if algorithm != Algorithm::BinarySearch {
        return Puzzle {
            values,
            target: None,
        };
    }

    values.sort_unstable();
    let target = target.unwrap_or_else(|| search_target(rng, &values, absent, min, max));
    Puzzle {
        values,
        target: Some(target),
    }
}

#[cfg(test)]
#[path = "tests/input_tests.rs"]
mod tests;
