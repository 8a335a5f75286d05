//! `st-signal`: fixed-time signal scheduling and crosswalk gates.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`phase`]      | `SignalGroup`, `VehiclePhase`, `PhaseTimings`                 |
//! | [`controller`] | `TrafficLightController`: two-group fixed-time cycle          |
//! | [`leg`]        | `VehicleSignalSource` capability, `SignalLeg`                 |
//! | [`gate`]       | `CrosswalkZone`, `CrosswalkKind`, `GateSet`, `NearestVehicleQuery` |
//! | [`error`]      | `SignalError`, `SignalResult<T>`                              |
//!
//! # Time
//!
//! Every query takes `now` in simulation seconds (`SimClock::now_secs`).
//! Controllers hold no per-tick state: the phase is a pure function of
//! `(now - epoch) mod cycle`, so the same controller can be shared behind an
//! `Arc` by any number of legs and gates.
//!
//! # Occupancy
//!
//! A gate counts the pedestrians currently on it with an `AtomicU32`.
//! `notify_pedestrian_start`/`_end` take `&self`, so pedestrians may be
//! ticked from several threads against one `GateSet`.

pub mod controller;
pub mod error;
pub mod gate;
pub mod leg;
pub mod phase;

#[cfg(test)]
mod tests;

pub use controller::TrafficLightController;
pub use error::{SignalError, SignalResult};
pub use gate::{CrosswalkKind, CrosswalkZone, GateSet, NearestVehicleQuery, NoVehicles};
pub use leg::{SignalLeg, VehicleSignalSource};
pub use phase::{PhaseTimings, SignalGroup, VehiclePhase};
