//! Crosswalk gates: the single point pedestrians and vehicles both consult
//! before entering a crosswalk.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use st_core::{GateId, Vec2};

use crate::{SignalError, SignalResult, VehiclePhase, VehicleSignalSource};

/// Default zebra clearance: pedestrians step out only when every vehicle is
/// farther than this.
pub const DEFAULT_ZEBRA_MIN_CAR_DISTANCE: f32 = 3.0;

// ── Capabilities ──────────────────────────────────────────────────────────────

/// Distance from a point to the closest live vehicle.
///
/// Returns `f32::INFINITY` when there are no vehicles.
pub trait NearestVehicleQuery: Sync {
    fn nearest_vehicle_distance(&self, pos: Vec2) -> f32;
}

impl<F> NearestVehicleQuery for F
where
    F: Fn(Vec2) -> f32 + Sync,
{
    fn nearest_vehicle_distance(&self, pos: Vec2) -> f32 {
        self(pos)
    }
}

/// An empty road.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoVehicles;

impl NearestVehicleQuery for NoVehicles {
    fn nearest_vehicle_distance(&self, _pos: Vec2) -> f32 {
        f32::INFINITY
    }
}

// ── CrosswalkZone ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CrosswalkKind {
    /// Pedestrians walk only while the bound signal is red for vehicles.
    Signalised,
    /// Pedestrians have priority once the nearest vehicle is clear.
    Zebra,
}

/// One crosswalk.
///
/// Occupancy is a reference count rather than a flag: two pedestrians can be
/// on the crossing at once, and the first one off must not clear it for the
/// second.
pub struct CrosswalkZone {
    id:                         GateId,
    pub pos:                    Vec2,
    pub kind:                   CrosswalkKind,
    signal:                     Option<Arc<dyn VehicleSignalSource>>,
    pub zebra_min_car_distance: f32,
    occupancy:                  AtomicU32,
}

impl CrosswalkZone {
    pub fn new(pos: Vec2, kind: CrosswalkKind) -> Self {
        Self {
            id: GateId::INVALID,
            pos,
            kind,
            signal: None,
            zebra_min_car_distance: DEFAULT_ZEBRA_MIN_CAR_DISTANCE,
            occupancy: AtomicU32::new(0),
        }
    }

    pub fn zebra(pos: Vec2) -> Self {
        Self::new(pos, CrosswalkKind::Zebra)
    }

    /// A signalised crossing driven by `source`.
    pub fn signalised(pos: Vec2, source: Arc<dyn VehicleSignalSource>) -> Self {
        Self::new(pos, CrosswalkKind::Signalised).with_signal(source)
    }

    pub fn with_signal(mut self, source: Arc<dyn VehicleSignalSource>) -> Self {
        self.signal = Some(source);
        self
    }

    pub fn with_zebra_min_car_distance(mut self, distance: f32) -> Self {
        self.zebra_min_car_distance = distance;
        self
    }

    /// Id assigned by [`GateSet::add`]; `GateId::INVALID` before that.
    #[inline]
    pub fn id(&self) -> GateId {
        self.id
    }

    // ── Pedestrian side ───────────────────────────────────────────────────

    /// May a pedestrian step onto the crossing now?
    ///
    /// Signalised: only while a bound source shows red to vehicles; with no
    /// source this is always `false`.  Zebra: if someone is already crossing
    /// (traffic is stopped anyway), or the nearest vehicle is strictly
    /// farther than `zebra_min_car_distance`.
    pub fn can_pedestrian_start_crossing(&self, now: f64, vehicles: &dyn NearestVehicleQuery) -> bool {
        match self.kind {
            CrosswalkKind::Signalised => self.signal_is_red(now),
            CrosswalkKind::Zebra => {
                self.someone_is_crossing()
                    || vehicles.nearest_vehicle_distance(self.pos) > self.zebra_min_car_distance
            }
        }
    }

    pub fn notify_pedestrian_start(&self) {
        self.occupancy.fetch_add(1, Ordering::AcqRel);
    }

    /// Saturates at zero.
    pub fn notify_pedestrian_end(&self) {
        let _ = self
            .occupancy
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));
    }

    #[inline]
    pub fn occupancy(&self) -> u32 {
        self.occupancy.load(Ordering::Acquire)
    }

    #[inline]
    pub fn someone_is_crossing(&self) -> bool {
        self.occupancy() > 0
    }

    // ── Vehicle side ──────────────────────────────────────────────────────

    /// Always `false` for zebras.
    pub fn is_red_for_vehicles(&self, now: f64) -> bool {
        self.kind == CrosswalkKind::Signalised && self.signal_is_red(now)
    }

    /// The bound source's phase; `None` for zebras and unbound gates.
    pub fn vehicle_phase(&self, now: f64) -> Option<VehiclePhase> {
        match self.kind {
            CrosswalkKind::Signalised => self.signal.as_ref().map(|s| s.phase(now)),
            CrosswalkKind::Zebra => None,
        }
    }

    pub fn should_vehicles_stop(&self, now: f64) -> bool {
        self.is_red_for_vehicles(now) || self.someone_is_crossing()
    }

    fn signal_is_red(&self, now: f64) -> bool {
        self.signal.as_ref().is_some_and(|s| s.is_red_for_vehicles(now))
    }
}

impl fmt::Debug for CrosswalkZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrosswalkZone")
            .field("id", &self.id)
            .field("pos", &self.pos)
            .field("kind", &self.kind)
            .field("has_signal", &self.signal.is_some())
            .field("zebra_min_car_distance", &self.zebra_min_car_distance)
            .field("occupancy", &self.occupancy())
            .finish()
    }
}

// ── GateSet ───────────────────────────────────────────────────────────────────

/// Owning, `GateId`-indexed collection of crosswalks.
#[derive(Debug, Default)]
pub struct GateSet {
    gates: Vec<CrosswalkZone>,
}

impl GateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `gate` and return its id (sequential from 0).
    ///
    /// A signalised gate without a source is accepted but can never let a
    /// pedestrian start, so it is logged.
    pub fn add(&mut self, mut gate: CrosswalkZone) -> GateId {
        let id = GateId(self.gates.len() as u32);
        gate.id = id;
        if gate.kind == CrosswalkKind::Signalised && gate.signal.is_none() {
            log::warn!("signalised crosswalk {id} at {} has no signal source; pedestrians will never get a walk phase", gate.pos);
        }
        self.gates.push(gate);
        id
    }

    #[inline]
    pub fn get(&self, id: GateId) -> Option<&CrosswalkZone> {
        self.gates.get(id.index())
    }

    /// Like [`get`](Self::get) but reports unknown ids as an error.
    pub fn require(&self, id: GateId) -> SignalResult<&CrosswalkZone> {
        self.get(id).ok_or(SignalError::UnknownGate(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CrosswalkZone> + '_ {
        self.gates.iter()
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// Total pedestrians currently on any crossing.
    pub fn total_occupancy(&self) -> u32 {
        self.gates.iter().map(CrosswalkZone::occupancy).sum()
    }
}
