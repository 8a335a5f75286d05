//! `st-sim`: tick loop orchestrator for street_sim.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Snapshot    pedestrian positions (what enforcers look at).
//!   ② Pedestrians tick every pedestrian against a shared read-only
//!                 PedContext (parallel with the `parallel` feature).
//!   ③ Apply       for each pedestrian in ascending PedId order:
//!                   Violation         → publish on the ViolationBus
//!                   CrossingFinished  → record on the global crossing lock
//!                   every event       → SimObserver::on_ped_event
//!   ④ Leaders     freeze every vehicle pose into a LeaderSnapshot.
//!   ⑤ Vehicles    plan and integrate (parallel with the `parallel` feature).
//!   ⑥ Despawn     vehicles that ran off a dead-end path.
//!   ⑦ Advance     the clock.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Runs the pedestrian and vehicle phases on Rayon.            |
//! | `fx-hash`  | Uses `FxHashMap` for the per-tick position snapshot.        |
//! | `serde`    | Forwards `serde` derives to every sub-crate.                |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use st_core::{SimConfig, Vec2};
//! use st_pedestrian::PedRole;
//! use st_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default())
//!     .graph(graph)
//!     .gates(gates)
//!     .lanes(lanes)
//!     .build()?;
//! sim.spawn_pedestrian(PedRole::Normal, Vec2::new(0.0, 0.0), Vec2::FORWARD);
//! sim.run(&mut NoopObserver);
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
