use thiserror::Error;

use st_core::PathId;

/// Errors produced by `st-lane`.
#[derive(Debug, Error)]
pub enum LaneError {
    #[error("lane path {path} has {points} points (need at least 2)")]
    TooFewPoints { path: PathId, points: usize },

    #[error("lane path {0} has zero length")]
    ZeroLength(PathId),

    #[error("lane path {path} continues into unknown path {next}")]
    UnknownNext { path: PathId, next: PathId },

    #[error("lane path {0} not found")]
    UnknownPath(PathId),
}

pub type LaneResult<T> = Result<T, LaneError>;
