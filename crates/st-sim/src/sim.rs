//! The `Sim` struct and its tick loop.

use st_core::{PathId, PedId, SimClock, SimConfig, Tick, Vec2, VehicleId};
use st_lane::LaneNetwork;
use st_nav::{CrossingLock, LockScope, NodeGraph};
use st_pedestrian::{
    LineOfSightProvider, NavSurface, PedConfig, PedContext, PedEvent, PedRole, Pedestrian,
    ViolationBus, ViolationInbox,
};
use st_signal::GateSet;
use st_vehicle::{StopMarker, VehicleConfig, VehicleContext, VehicleFleet};

use crate::SimObserver;

#[cfg(feature = "fx-hash")]
type PositionMap = rustc_hash::FxHashMap<PedId, Vec2>;
#[cfg(not(feature = "fx-hash"))]
type PositionMap = std::collections::HashMap<PedId, Vec2>;

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` owns the static scene (graph, gates, lanes, stops), every agent,
/// the violation bus, and the shared crossing lock.  Each tick runs a
/// pedestrian phase, a sequential apply phase, and a vehicle phase; see the
/// crate docs for the full order.
///
/// Pedestrians and vehicles are kept in ascending id order.  Ids are handed
/// out sequentially and never reused.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Global configuration (tick duration, total ticks, seed, …).
    pub config: SimConfig,

    /// Simulation clock: tracks the current tick and maps it to seconds.
    pub clock: SimClock,

    pub ped_config:     PedConfig,
    pub vehicle_config: VehicleConfig,

    /// Pedestrian navigation graph.  Claim counts live here.
    pub graph: NodeGraph,

    /// Crosswalks, shared by pedestrians (occupancy) and vehicles (yield).
    pub gates: GateSet,

    pub lanes: LaneNetwork,
    pub stops: Vec<StopMarker>,

    pub(crate) sight:       Box<dyn LineOfSightProvider>,
    pub(crate) surface:     Box<dyn NavSurface>,

    pub(crate) pedestrians: Vec<Pedestrian>,
    pub(crate) next_ped:    u32,
    pub(crate) vehicles:    VehicleFleet,

    pub(crate) bus:         ViolationBus,
    /// Only consulted when `ped_config.lock_scope` is `Global`.
    pub(crate) global_lock: CrossingLock,

    #[cfg(feature = "parallel")]
    pub(crate) pool:        Option<rayon::ThreadPool>,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    /// Run one tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let tick = self.clock.current_tick;
        observer.on_tick_start(tick);

        let events = self.pedestrian_phase();
        self.apply_ped_events(tick, events, observer);
        self.vehicle_phase();

        for vehicle in self.vehicles.remove_finished() {
            log::debug!("{} finished its route at {}", vehicle.id(), vehicle.pos());
            observer.on_vehicle_finished(tick, &vehicle);
        }

        observer.on_tick_end(tick, &self.pedestrians, &self.vehicles);
        self.clock.advance();
    }

    /// Simulation seconds at the current tick.
    pub fn now_secs(&self) -> f64 {
        self.clock.now_secs()
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    /// Add a pedestrian at `pos`, adopting the nearest node within
    /// `ped_config.spawn_snap_radius` as its current node.  Enforcers are
    /// subscribed to the violation bus.
    pub fn spawn_pedestrian(&mut self, role: PedRole, pos: Vec2, facing: Vec2) -> PedId {
        let id = PedId(self.next_ped);
        self.next_ped += 1;

        let mut ped = Pedestrian::new(id, role, pos, facing, self.config.seed, &self.ped_config);
        if ped.snap_to_graph(&self.graph, self.ped_config.spawn_snap_radius).is_none() {
            log::debug!("{id} spawned at {pos} with no node within {}", self.ped_config.spawn_snap_radius);
        }
        if role == PedRole::Enforcer {
            let inbox = ViolationInbox::new();
            let subscription = self.bus.subscribe(Box::new(inbox.clone()));
            ped.attach_inbox(inbox, subscription);
        }

        self.pedestrians.push(ped);
        id
    }

    /// Remove a pedestrian, releasing its node claim, any crosswalk it is on,
    /// and its bus subscription.
    pub fn despawn_pedestrian(&mut self, id: PedId) -> Option<Pedestrian> {
        let slot = self.pedestrians.binary_search_by_key(&id, Pedestrian::id).ok()?;
        let mut ped = self.pedestrians.remove(slot);
        ped.release_all(&self.graph, &self.gates);
        if let Some(subscription) = ped.subscription() {
            self.bus.unsubscribe(subscription);
        }
        Some(ped)
    }

    /// Add a vehicle at the start of `path`.  An unknown path yields an
    /// inert vehicle.
    pub fn spawn_vehicle(&mut self, path: PathId, transit: bool) -> VehicleId {
        self.vehicles.spawn(path, transit, &self.lanes)
    }

    /// Add a hand-placed vehicle, projected onto the lane whose start is
    /// nearest to `pos`.
    pub fn spawn_vehicle_at(&mut self, pos: Vec2, heading: Vec2, transit: bool) -> VehicleId {
        self.vehicles.spawn_at(pos, heading, transit, &self.lanes, &self.vehicle_config)
    }

    pub fn despawn_vehicle(&mut self, id: VehicleId) -> bool {
        self.vehicles.despawn(id).is_some()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn pedestrians(&self) -> &[Pedestrian] {
        &self.pedestrians
    }

    pub fn pedestrian(&self, id: PedId) -> Option<&Pedestrian> {
        let slot = self.pedestrians.binary_search_by_key(&id, Pedestrian::id).ok()?;
        self.pedestrians.get(slot)
    }

    pub fn vehicles(&self) -> &VehicleFleet {
        &self.vehicles
    }

    pub fn bus(&self) -> &ViolationBus {
        &self.bus
    }

    /// Subscribe external listeners (score keepers, loggers) to violations.
    pub fn bus_mut(&mut self) -> &mut ViolationBus {
        &mut self.bus
    }

    /// The population-wide crossing lock used under `LockScope::Global`.
    pub fn global_lock(&self) -> &CrossingLock {
        &self.global_lock
    }

    // ── Pedestrian phase (produce) ────────────────────────────────────────

    /// Tick every pedestrian against one shared context.  Returns each
    /// pedestrian's events in ascending id order.
    fn pedestrian_phase(&mut self) -> Vec<(PedId, Vec<PedEvent>)> {
        let positions: PositionMap = self.pedestrians.iter().map(|p| (p.id(), p.pos())).collect();

        // Explicit field borrows so the borrow checker sees disjoint access.
        let global = (self.ped_config.lock_scope == LockScope::Global).then_some(&self.global_lock);
        let ctx = PedContext {
            config:      &self.ped_config,
            graph:       &self.graph,
            gates:       &self.gates,
            vehicles:    &self.vehicles,
            sight:       &*self.sight,
            surface:     &*self.surface,
            positions:   &positions,
            global_lock: global,
            now:         self.clock.now_secs(),
            dt:          self.clock.dt(),
        };
        let peds = &mut self.pedestrians;

        #[cfg(not(feature = "parallel"))]
        {
            peds.iter_mut().map(|p| (p.id(), p.tick(&ctx))).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let work = || peds.par_iter_mut().map(|p| (p.id(), p.tick(&ctx))).collect::<Vec<_>>();
            match &self.pool {
                Some(pool) => pool.install(work),
                None => work(),
            }
        }
    }

    // ── Apply phase (consume) ─────────────────────────────────────────────

    /// Apply pedestrian events sequentially.  Events arrive in ascending
    /// `PedId` order, so results do not depend on how the pedestrian phase
    /// was scheduled.
    fn apply_ped_events<O: SimObserver>(
        &mut self,
        tick:     Tick,
        events:   Vec<(PedId, Vec<PedEvent>)>,
        observer: &mut O,
    ) {
        let now = self.clock.now_secs();
        let global = self.ped_config.lock_scope == LockScope::Global;

        for (ped, ped_events) in events {
            for event in ped_events {
                match &event {
                    PedEvent::Violation(v) => self.bus.publish(v),
                    PedEvent::CrossingFinished { .. } if global => {
                        if self.global_lock.record(now, &self.ped_config.lock) {
                            log::debug!(
                                "crossing lock engaged for everyone until {:.2}s",
                                self.global_lock.lock_until()
                            );
                        }
                    }
                    _ => {}
                }
                observer.on_ped_event(tick, ped, &event);
            }
        }
    }

    // ── Vehicle phase ─────────────────────────────────────────────────────

    fn vehicle_phase(&mut self) {
        let leaders = self.vehicles.snapshot();
        let ctx = VehicleContext {
            config:  &self.vehicle_config,
            lanes:   &self.lanes,
            gates:   &self.gates,
            stops:   &self.stops,
            leaders: &leaders,
            now:     self.clock.now_secs(),
            dt:      self.clock.dt(),
        };

        #[cfg(not(feature = "parallel"))]
        {
            self.vehicles.tick_all(&ctx);
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let vehicles = self.vehicles.vehicles_mut();
            let work = || {
                vehicles.par_iter_mut().for_each(|v| {
                    v.tick(&ctx);
                })
            };
            match &self.pool {
                Some(pool) => pool.install(work),
                None => work(),
            }
        }
    }
}
