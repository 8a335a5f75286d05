//! Read-only world state passed to every pedestrian tick.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use st_core::{PedId, Vec2};
use st_nav::{CrossingLock, NodeGraph};
use st_signal::{GateSet, NearestVehicleQuery};

use crate::{LineOfSightProvider, NavSurface, PedConfig};

/// Where other pedestrians were at the start of this tick.
pub trait PositionLookup: Sync {
    fn position_of(&self, id: PedId) -> Option<Vec2>;
}

impl<S: BuildHasher + Sync> PositionLookup for HashMap<PedId, Vec2, S> {
    fn position_of(&self, id: PedId) -> Option<Vec2> {
        self.get(&id).copied()
    }
}

impl PositionLookup for BTreeMap<PedId, Vec2> {
    fn position_of(&self, id: PedId) -> Option<Vec2> {
        self.get(&id).copied()
    }
}

/// A read-only snapshot of the world for one pedestrian tick.
///
/// Built once per tick by the simulation and shared by every pedestrian in
/// the intent phase.  Claims and gate occupancy are mutated through `&self`
/// atomics; nothing else here changes while the context is live.
pub struct PedContext<'a> {
    pub config:      &'a PedConfig,
    pub graph:       &'a NodeGraph,
    pub gates:       &'a GateSet,
    pub vehicles:    &'a dyn NearestVehicleQuery,
    pub sight:       &'a dyn LineOfSightProvider,
    pub surface:     &'a dyn NavSurface,
    /// Pedestrian positions at the start of the tick.
    pub positions:   &'a dyn PositionLookup,
    /// The shared crossing lock, when `config.lock_scope` is `Global`.
    pub global_lock: Option<&'a CrossingLock>,
    /// Simulation seconds.
    pub now:         f64,
    pub dt:          f32,
}
