//! Ownership of every vehicle in a simulation.

use st_core::{PathId, VehicleId, Vec2};
use st_lane::{LaneNetwork, PathCursor};
use st_signal::NearestVehicleQuery;

use crate::{LeaderSnapshot, VehicleAgent, VehicleConfig, VehicleContext};

/// All vehicles, kept in ascending id order.
///
/// Ids are handed out sequentially and never reused, so pushing keeps the
/// order and lookups are a binary search.
#[derive(Debug, Default)]
pub struct VehicleFleet {
    vehicles: Vec<VehicleAgent>,
    next_id:  u32,
    seed:     u64,
}

impl VehicleFleet {
    pub fn new(seed: u64) -> Self {
        Self { vehicles: Vec::new(), next_id: 0, seed }
    }

    fn next_id(&mut self) -> VehicleId {
        let id = VehicleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Spawn a vehicle at the start of `path`.
    pub fn spawn(&mut self, path: PathId, transit: bool, lanes: &LaneNetwork) -> VehicleId {
        self.spawn_on(PathCursor::at_start(path), transit, lanes)
    }

    /// Spawn a vehicle at an explicit point along a path.
    pub fn spawn_on(&mut self, cursor: PathCursor, transit: bool, lanes: &LaneNetwork) -> VehicleId {
        let id = self.next_id();
        self.vehicles.push(VehicleAgent::on_path(id, cursor, transit, lanes, self.seed));
        id
    }

    /// Spawn a hand-placed vehicle; see [`VehicleAgent::placed`].
    pub fn spawn_at(
        &mut self,
        pos:     Vec2,
        heading: Vec2,
        transit: bool,
        lanes:   &LaneNetwork,
        config:  &VehicleConfig,
    ) -> VehicleId {
        let id = self.next_id();
        self.vehicles.push(VehicleAgent::placed(id, pos, heading, transit, lanes, config, self.seed));
        id
    }

    pub fn despawn(&mut self, id: VehicleId) -> Option<VehicleAgent> {
        let slot = self.vehicles.binary_search_by_key(&id, VehicleAgent::id).ok()?;
        Some(self.vehicles.remove(slot))
    }

    pub fn get(&self, id: VehicleId) -> Option<&VehicleAgent> {
        let slot = self.vehicles.binary_search_by_key(&id, VehicleAgent::id).ok()?;
        self.vehicles.get(slot)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleAgent> + '_ {
        self.vehicles.iter()
    }

    /// Mutable access for the vehicle phase.  Each vehicle only writes its
    /// own state during a tick, so the slice may be split across threads.
    pub fn vehicles_mut(&mut self) -> &mut [VehicleAgent] {
        &mut self.vehicles
    }

    /// Poses of every live vehicle, for car following.
    pub fn snapshot(&self) -> LeaderSnapshot {
        LeaderSnapshot::new(self.vehicles.iter().filter_map(VehicleAgent::snapshot).collect())
    }

    /// Tick every vehicle in id order.
    pub fn tick_all(&mut self, ctx: &VehicleContext<'_>) {
        for v in &mut self.vehicles {
            v.tick(ctx);
        }
    }

    /// Remove and return the vehicles that reached the end of their route.
    pub fn remove_finished(&mut self) -> Vec<VehicleAgent> {
        let (done, live): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.vehicles).into_iter().partition(VehicleAgent::is_finished);
        self.vehicles = live;
        done
    }
}

impl NearestVehicleQuery for VehicleFleet {
    /// Distance to the closest live vehicle; inert and finished vehicles do
    /// not count.
    fn nearest_vehicle_distance(&self, pos: Vec2) -> f32 {
        self.vehicles
            .iter()
            .filter(|v| v.is_live())
            .map(|v| v.pos().distance(pos))
            .fold(f32::INFINITY, f32::min)
    }
}
