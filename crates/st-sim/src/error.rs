use st_core::{CoreError, StopId};
use st_lane::LaneError;
use st_nav::NavError;
use st_signal::SignalError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("stop marker {0} appears more than once")]
    DuplicateStop(StopId),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("navigation graph: {0}")]
    Nav(#[from] NavError),

    #[error("lane network: {0}")]
    Lane(#[from] LaneError),

    #[error("signals: {0}")]
    Signal(#[from] SignalError),
}

pub type SimResult<T> = Result<T, SimError>;
