use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Storage,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown algorithm '{0}' (expected merge_sort, quick_sort or binary_search)")]
    UnknownAlgorithm(String),
    #[error("unknown level '{0}' (expected easy, medium, hard or expert)")]
    UnknownLevel(String),
    #[error("unknown side '{0}' (expected left or right)")]
    UnknownSide(String),
    #[error("unknown strategy '{0}' (expected correct, wrong or alternate)")]
    UnknownStrategy(String),
    #[error("invalid value '{0}' in value list")]
    InvalidValue(String),
    #[error("value range [{min}, {max}) holds fewer than {requested} distinct values")]
    RangeTooSmall { min: i64, max: i64, requested: usize },
}

impl GameError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Validation
    }
}
