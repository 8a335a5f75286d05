//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` via `From`
//! where config validation can fail beneath them.

use thiserror::Error;

/// The top-level error type for `st-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `st-core`.
pub type CoreResult<T> = Result<T, CoreError>;
