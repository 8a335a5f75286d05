//! `st-core`: foundational types for the `street_sim` traffic core.
//!
//! This crate is a dependency of every other `st-*` crate.  It intentionally
//! has no `st-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`ids`]         | `PedId`, `VehicleId`, `NodeId`, `GroupId`, `GateId`, …      |
//! | [`geo`]         | `Vec2` ground-plane vector, `Segment`                       |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                             |
//! | [`rng`]         | `AgentRng` (per-agent deterministic RNG)                    |
//! | [`error`]       | `CoreError`, `CoreResult`                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{Segment, Vec2};
pub use ids::{GateId, GroupId, NodeId, PathId, PedId, StopId, VehicleId};
pub use rng::AgentRng;
pub use time::{SimClock, SimConfig, Tick};
