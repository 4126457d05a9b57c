//! Session scoring: per-decision points and end-of-run bonuses.
//!
//! The keeper never reads a clock for durations. Callers measure response
//! and session times and pass them in.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{Algorithm, Level, RunId},
    protocol::RunSummary,
};
use tracing::debug;

pub const BASE_POINTS: f64 = 100.0;
pub const STREAK_STEP: u64 = 100;
pub const STREAK_CAP: u64 = 1000;
pub const MAX_PENALTY: u64 = 200;
pub const COMPLETION_POINTS: f64 = 500.0;
pub const PERFECT_BONUS: u64 = 2000;
pub const TIME_BONUS: f64 = 1000.0;

/// Answers faster than this earn a response bonus.
pub const FAST_RESPONSE: Duration = Duration::from_secs(3);
const RESPONSE_BONUS_PER_SEC: f64 = 50.0;

/// Completion window for the time bonus before the level multiplier.
pub const TIME_BONUS_WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionBonus {
    pub completion: u64,
    pub perfect: u64,
    pub time: u64,
}

impl CompletionBonus {
    pub fn total(&self) -> u64 {
        self.completion + self.perfect + self.time
    }
}

#[derive(Debug, Clone)]
pub struct ScoreKeeper {
    algorithm: Algorithm,
    level: Level,
    elements: usize,
    score: u64,
    correct: u32,
    incorrect: u32,
    streak: u32,
    best_streak: u32,
}

impl ScoreKeeper {
    pub fn new(algorithm: Algorithm, level: Level, elements: usize) -> Self {
        Self {
            algorithm,
            level,
            elements,
            score: 0,
            correct: 0,
            incorrect: 0,
            streak: 0,
            best_streak: 0,
        }
    }

    /// Awards a correct decision answered after `response`. A zero response
    /// time earns no speed bonus.
    pub fn record_correct(&mut self, response: Duration) -> u64 {
        self.correct += 1;
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);

        let points = ((BASE_POINTS + response_bonus(response) + self.streak_bonus() as f64)
            * self.level.multiplier()) as u64;
        self.score += points;
        debug!(points, streak = self.streak, score = self.score, "correct decision scored");
        points
    }

    /// Applies the penalty for a wrong decision and returns the points lost.
    pub fn record_wrong(&mut self) -> u64 {
        self.incorrect += 1;
        self.streak = 0;

        let penalty = (self.score / 10).min(MAX_PENALTY);
        self.score -= penalty;
        debug!(penalty, score = self.score, "wrong decision penalized");
        penalty
    }

    pub fn record(&mut self, correct: bool, response: Duration) -> i64 {
        if correct {
            self.record_correct(response) as i64
        } else {
            -(self.record_wrong() as i64)
        }
    }

    fn streak_bonus(&self) -> u64 {
        (u64::from(self.streak) * STREAK_STEP).min(STREAK_CAP)
    }

    /// Bonuses granted when a run is completed in `elapsed`.
    pub fn completion_bonus(&self, elapsed: Duration) -> CompletionBonus {
        let multiplier = self.level.multiplier();
        let window = TIME_BONUS_WINDOW.as_secs_f64() * multiplier;
        let elapsed = elapsed.as_secs_f64();

        CompletionBonus {
            completion: (COMPLETION_POINTS * multiplier) as u64,
            perfect: if self.incorrect == 0 { PERFECT_BONUS } else { 0 },
            time: if elapsed < window {
                ((window - elapsed) / window * TIME_BONUS) as u64
            } else {
                0
            },
        }
    }

    /// Closes the run. Bonuses apply only when `completed`.
    pub fn finish(self, elapsed: Duration, completed: bool) -> RunSummary {
        self.finish_at(elapsed, completed, Utc::now())
    }

    pub fn finish_at(
        mut self,
        elapsed: Duration,
        completed: bool,
        recorded_at: DateTime<Utc>,
    ) -> RunSummary {
        if completed {
            let bonus = self.completion_bonus(elapsed);
            debug!(?bonus, "completion bonus granted");
            self.score += bonus.total();
        }

        RunSummary {
            run_id: RunId::new(),
            algorithm: self.algorithm,
            level: self.level,
            elements: self.elements,
            elapsed_secs: elapsed.as_secs_f64(),
            correct: self.correct,
            incorrect: self.incorrect,
            score: self.score,
            recorded_at,
            completed,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

fn response_bonus(response: Duration) -> f64 {
    if response.is_zero() {
        return 0.0;
    }
    ((FAST_RESPONSE.as_secs_f64() - response.as_secs_f64()) * RESPONSE_BONUS_PER_SEC).max(0.0)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
