//! `st-vehicle`: lane-following vehicles.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`agent`]   | `VehicleAgent`: plan / integrate / steer controller               |
//! | [`config`]  | `VehicleConfig`                                                   |
//! | [`context`] | `VehicleContext<'a>`: read-only world state for one tick          |
//! | [`leader`]  | `LeaderSnapshot`, `following_cap`: car following                  |
//! | [`stop`]    | `StopMarker`: transit stops                                       |
//! | [`fleet`]   | `VehicleFleet`: ownership, spawning, nearest-vehicle queries      |
//!
//! # Tick model
//!
//! The simulation freezes every vehicle's pose into a [`LeaderSnapshot`]
//! before the vehicle phase.  Each vehicle then plans against that snapshot
//! and writes only its own state, so update order never changes the result.

pub mod agent;
pub mod config;
pub mod context;
pub mod fleet;
pub mod leader;
pub mod stop;


pub use agent::{DwellState, VehicleAgent};
pub use config::VehicleConfig;
pub use context::VehicleContext;
pub use fleet::VehicleFleet;
pub use leader::{Leader, LeaderSnapshot, VehicleSnapshot, following_cap};
pub use stop::{DEFAULT_STOP_LATERAL_TOLERANCE, DEFAULT_STOP_TRIGGER_RADIUS, StopMarker};
