//! Simulation observer trait for progress reporting and data collection.

use st_core::{PedId, Tick};
use st_pedestrian::{PedEvent, Pedestrian};
use st_vehicle::{VehicleAgent, VehicleFleet};

/// Callbacks invoked by [`Sim`][crate::Sim] at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: violation counter
///
/// ```rust,ignore
/// struct Violations(usize);
///
/// impl SimObserver for Violations {
///     fn on_ped_event(&mut self, _tick: Tick, _ped: PedId, event: &PedEvent) {
///         if matches!(event, PedEvent::Violation(_)) {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every pedestrian event during the apply phase, in
    /// ascending `PedId` order and after the event has been applied.
    fn on_ped_event(&mut self, _tick: Tick, _ped: PedId, _event: &PedEvent) {}

    /// Called once for each vehicle removed at the end of its route.
    fn on_vehicle_finished(&mut self, _tick: Tick, _vehicle: &VehicleAgent) {}

    /// Called at the end of each tick with read-only access to every agent,
    /// so output writers can record positions without the sim knowing
    /// about any specific output format.
    fn on_tick_end(&mut self, _tick: Tick, _pedestrians: &[Pedestrian], _vehicles: &VehicleFleet) {}

    /// Called once after the final tick of [`Sim::run`][crate::Sim::run].
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
