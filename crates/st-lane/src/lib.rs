//! `st-lane`: lane geometry for vehicles.
//!
//! A lane is an ordered polyline baked once into cumulative arc lengths, so
//! every along-path query is a binary search instead of a walk.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                       |
//! |-------------|----------------------------------------------------------------|
//! | [`path`]    | `LanePath`: baked polyline + continuation candidates           |
//! | [`network`] | `LaneNetwork`, `LaneNetworkBuilder`                            |
//! | [`cursor`]  | `PathCursor`, `CursorStep`: distance-based progress            |
//! | [`error`]   | `LaneError`, `LaneResult<T>`                                   |

pub mod cursor;
pub mod error;
pub mod network;
pub mod path;

#[cfg(test)]
mod tests;

pub use cursor::{CursorStep, PathCursor};
pub use error::{LaneError, LaneResult};
pub use network::{LaneNetwork, LaneNetworkBuilder};
pub use path::LanePath;
