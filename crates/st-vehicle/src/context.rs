//! Read-only world state passed to every vehicle tick.

use st_lane::LaneNetwork;
use st_signal::GateSet;

use crate::{LeaderSnapshot, StopMarker, VehicleConfig};

/// A read-only snapshot of the world for one vehicle tick.
pub struct VehicleContext<'a> {
    pub config:  &'a VehicleConfig,
    pub lanes:   &'a LaneNetwork,
    pub gates:   &'a GateSet,
    pub stops:   &'a [StopMarker],
    /// Vehicle poses at the start of the tick.
    pub leaders: &'a LeaderSnapshot,
    /// Simulation seconds.
    pub now:     f64,
    pub dt:      f32,
}
