use thiserror::Error;

use st_core::GateId;

/// Errors produced by `st-signal`.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("signal duration `{field}` must be non-negative and finite, got {value}")]
    BadDuration { field: &'static str, value: f32 },

    #[error("gate {0} is not in the gate set")]
    UnknownGate(GateId),
}

pub type SignalResult<T> = Result<T, SignalError>;
