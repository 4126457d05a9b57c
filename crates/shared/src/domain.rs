use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GameError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(RunId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    MergeSort,
    QuickSort,
    BinarySearch,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::MergeSort,
        Algorithm::QuickSort,
        Algorithm::BinarySearch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::MergeSort => "merge_sort",
            Algorithm::QuickSort => "quick_sort",
            Algorithm::BinarySearch => "binary_search",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = GameError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "merge_sort" | "merge" => Ok(Algorithm::MergeSort),
            "quick_sort" | "quick" => Ok(Algorithm::QuickSort),
            "binary_search" | "search" => Ok(Algorithm::BinarySearch),
            _ => Err(GameError::UnknownAlgorithm(raw.to_string())),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

/// Per-level tuning shared by the player and the score keeper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpec {
    pub elements: usize,
    pub time_limit: Option<Duration>,
    pub hints: bool,
    pub multiplier: f64,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Easy, Level::Medium, Level::Hard, Level::Expert];

    pub fn spec(self) -> LevelSpec {
        match self {
            Level::Easy => LevelSpec {
                elements: 4,
                time_limit: None,
                hints: true,
                multiplier: 1.0,
            },
            Level::Medium => LevelSpec {
                elements: 6,
                time_limit: Some(Duration::from_secs(30)),
                hints: true,
                multiplier: 1.5,
            },
            Level::Hard => LevelSpec {
                elements: 8,
                time_limit: Some(Duration::from_secs(20)),
                hints: false,
                multiplier: 2.0,
            },
            Level::Expert => LevelSpec {
                elements: 12,
                time_limit: Some(Duration::from_secs(15)),
                hints: false,
                multiplier: 3.0,
            },
        }
    }

    pub fn multiplier(self) -> f64 {
        self.spec().multiplier
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
            Level::Expert => "expert",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = GameError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| GameError::UnknownLevel(raw.to_string()))
    }
}

/// The two answers every decision point accepts: the left list, the
/// "belongs before the pivot" bucket, or the lower half of the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn from_left(is_left: bool) -> Self {
        if is_left {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn is_left(self) -> bool {
        self == Side::Left
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl FromStr for Side {
    type Err = GameError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "l" | "left" | "<" => Ok(Side::Left),
            "r" | "right" | ">" => Ok(Side::Right),
            _ => Err(GameError::UnknownSide(raw.to_string())),
        }
    }
}

/// Scripted answer policy for autoplay and batch simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Correct,
    Wrong,
    Alternate,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Correct => "correct",
            Strategy::Wrong => "wrong",
            Strategy::Alternate => "alternate",
        }
    }

    /// Answer for the `turn`-th decision. `Alternate` opens with left.
    pub fn pick(self, expected: Option<Side>, turn: usize) -> Side {
        let truth = expected.unwrap_or(Side::Left);
        match self {
            Strategy::Correct => truth,
            Strategy::Wrong => truth.opposite(),
            Strategy::Alternate => Side::from_left(turn % 2 == 0),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = GameError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "correct" => Ok(Strategy::Correct),
            "wrong" => Ok(Strategy::Wrong),
            "alternate" | "alt" => Ok(Strategy::Alternate),
            _ => Err(GameError::UnknownStrategy(raw.to_string())),
        }
    }
}

/// Parses a comma or whitespace separated list such as `"5, 3 8,1"`.
pub fn parse_values(raw: &str) -> Result<Vec<i64>, GameError> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| GameError::InvalidValue(token.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_algorithm_aliases() {
        assert_eq!("merge".parse::<Algorithm>().unwrap(), Algorithm::MergeSort);
        assert_eq!(
            "Quick-Sort".parse::<Algorithm>().unwrap(),
            Algorithm::QuickSort
        );
        assert_eq!(
            "binary_search".parse::<Algorithm>().unwrap(),
            Algorithm::BinarySearch
        );
        assert!("bogo".parse::<Algorithm>().is_err());
    }

    #[test]
    fn level_table_matches_difficulty_curve() {
        assert_eq!(Level::Easy.spec().elements, 4);
        assert_eq!(Level::Expert.spec().elements, 12);
        assert!(Level::Easy.spec().time_limit.is_none());
        assert_eq!(
            Level::Hard.spec().time_limit,
            Some(Duration::from_secs(20))
        );
        assert!(!Level::Hard.spec().hints);
        assert_eq!(Level::Medium.multiplier(), 1.5);
        assert_eq!("EXPERT".parse::<Level>().unwrap(), Level::Expert);
    }

    #[test]
    fn parses_value_lists_with_mixed_separators() {
        assert_eq!(parse_values("5, 3 8,1").unwrap(), vec![5, 3, 8, 1]);
        assert!(parse_values("").unwrap().is_empty());
        assert!(matches!(
            parse_values("1,x"),
            Err(GameError::InvalidValue(token)) if token == "x"
        ));
    }

    #[test]
    fn side_round_trips_through_text() {
        assert_eq!("L".parse::<Side>().unwrap(), Side::Left);
        assert_eq!(">".parse::<Side>().unwrap(), Side::Right);
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::from_left(false), Side::Right);
    }

    #[test]
    fn strategies_pick_against_ground_truth() {
        assert_eq!(Strategy::Correct.pick(Some(Side::Right), 0), Side::Right);
        assert_eq!(Strategy::Wrong.pick(Some(Side::Right), 0), Side::Left);
        let alternate: Vec<Side> = (0..3)
            .map(|turn| Strategy::Alternate.pick(Some(Side::Right), turn))
            .collect();
        assert_eq!(alternate, vec![Side::Left, Side::Right, Side::Left]);
        assert_eq!("ALT".parse::<Strategy>().unwrap(), Strategy::Alternate);
        assert!("lucky".parse::<Strategy>().is_err());
    }
}
