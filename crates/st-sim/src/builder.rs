//! Fluent builder for constructing a [`Sim`].

use st_core::{GroupId, SimConfig};
use st_lane::LaneNetwork;
use st_nav::{CrossingLock, NodeGraph};
use st_pedestrian::{LineOfSightProvider, NavSurface, OpenSky, OpenSurface, PedConfig, ViolationBus};
use st_signal::GateSet;
use st_vehicle::{StopMarker, VehicleConfig, VehicleFleet};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick duration, total ticks, seed, thread count
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                              |
/// |-------------------------|--------------------------------------|
/// | `.graph(g)`             | `NodeGraph::empty()`                 |
/// | `.gates(g)`             | Empty `GateSet`                      |
/// | `.lanes(n)`             | `LaneNetwork::empty()`               |
/// | `.stops(v)`             | No transit stops                     |
/// | `.line_of_sight(p)`     | `OpenSky` (nothing blocks sight)     |
/// | `.nav_surface(s)`       | `OpenSurface` (everywhere walkable)  |
/// | `.ped_config(c)`        | `PedConfig::default()`               |
/// | `.vehicle_config(c)`    | `VehicleConfig::default()`           |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config)
///     .graph(graph)
///     .gates(gates)
///     .lanes(lanes)
///     .stops(vec![StopMarker::new(StopId(0), stop_pos, Vec2::new(1.0, 0.0))])
///     .line_of_sight(Occluders::new(walls))
///     .build()?;
/// sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:         SimConfig,
    graph:          Option<NodeGraph>,
    gates:          Option<GateSet>,
    lanes:          Option<LaneNetwork>,
    stops:          Vec<StopMarker>,
    sight:          Option<Box<dyn LineOfSightProvider>>,
    surface:        Option<Box<dyn NavSurface>>,
    ped_config:     PedConfig,
    vehicle_config: VehicleConfig,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            graph:          None,
            gates:          None,
            lanes:          None,
            stops:          Vec::new(),
            sight:          None,
            surface:        None,
            ped_config:     PedConfig::default(),
            vehicle_config: VehicleConfig::default(),
        }
    }

    /// Supply the pedestrian navigation graph.
    ///
    /// If not called, pedestrians have nowhere to go: every pick fails and
    /// they idle where they spawned.
    pub fn graph(mut self, graph: NodeGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    /// Supply the crosswalks.  Every gate a crossing group is bound to must
    /// be in this set.
    pub fn gates(mut self, gates: GateSet) -> Self {
        self.gates = Some(gates);
        self
    }

    /// Supply the lane network vehicles drive on.
    ///
    /// If not called, every spawned vehicle is inert.
    pub fn lanes(mut self, lanes: LaneNetwork) -> Self {
        self.lanes = Some(lanes);
        self
    }

    /// Supply transit stop markers.  Stop ids must be unique.
    pub fn stops(mut self, stops: Vec<StopMarker>) -> Self {
        self.stops = stops;
        self
    }

    pub fn line_of_sight(mut self, sight: impl LineOfSightProvider + 'static) -> Self {
        self.sight = Some(Box::new(sight));
        self
    }

    pub fn nav_surface(mut self, surface: impl NavSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    pub fn ped_config(mut self, config: PedConfig) -> Self {
        self.ped_config = config;
        self
    }

    pub fn vehicle_config(mut self, config: VehicleConfig) -> Self {
        self.vehicle_config = config;
        self
    }

    /// Validate inputs and return a ready-to-run [`Sim`] with no agents.
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        validate_ped_config(&self.ped_config)?;
        validate_vehicle_config(&self.vehicle_config)?;

        let graph = self.graph.unwrap_or_else(NodeGraph::empty);
        let gates = self.gates.unwrap_or_default();
        let lanes = self.lanes.unwrap_or_else(LaneNetwork::empty);

        // ── Cross-check the graph against the gate set ────────────────────
        for g in 0..graph.group_count() {
            if let Some(gate) = graph.group_gate(GroupId(g as u32)) {
                gates.require(gate)?;
            }
        }

        for (i, stop) in self.stops.iter().enumerate() {
            if self.stops[..i].iter().any(|s| s.id == stop.id) {
                return Err(SimError::DuplicateStop(stop.id));
            }
        }

        #[cfg(feature = "parallel")]
        let pool = match self.config.num_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SimError::Config(format!("thread pool: {e}")))?,
            ),
            None => None,
        };

        log::info!(
            "street sim ready: {} nodes, {} crossing groups, {} gates, {} lane paths, {} stops, {} ticks of {:.3}s",
            graph.node_count(),
            graph.group_count(),
            gates.len(),
            lanes.len(),
            self.stops.len(),
            self.config.total_ticks,
            self.config.tick_duration_secs,
        );

        Ok(Sim {
            clock:          self.config.make_clock(),
            vehicles:       VehicleFleet::new(self.config.seed),
            config:         self.config,
            ped_config:     self.ped_config,
            vehicle_config: self.vehicle_config,
            graph,
            gates,
            lanes,
            stops:          self.stops,
            sight:          self.sight.unwrap_or_else(|| Box::new(OpenSky)),
            surface:        self.surface.unwrap_or_else(|| Box::new(OpenSurface)),
            pedestrians:    Vec::new(),
            next_ped:       0,
            bus:            ViolationBus::new(),
            global_lock:    CrossingLock::new(),
            #[cfg(feature = "parallel")]
            pool,
        })
    }
}

fn validate_ped_config(cfg: &PedConfig) -> SimResult<()> {
    if !(cfg.walk_speed.is_finite() && cfg.walk_speed > 0.0) {
        return Err(SimError::Config(format!("walk_speed must be positive, got {}", cfg.walk_speed)));
    }
    let (lo, hi) = cfg.speed_multiplier_range;
    if !(lo <= hi) {
        return Err(SimError::Config(format!("speed_multiplier_range ({lo}, {hi}) is empty")));
    }
    if cfg.max_pick_tries == 0 {
        return Err(SimError::Config("max_pick_tries must be at least 1".into()));
    }
    Ok(())
}

fn validate_vehicle_config(cfg: &VehicleConfig) -> SimResult<()> {
    for (field, value) in [
        ("cruise_speed", cfg.cruise_speed),
        ("accel", cfg.accel),
        ("decel", cfg.decel),
        ("time_headway", cfg.time_headway),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(SimError::Config(format!("{field} must be positive, got {value}")));
        }
    }
    Ok(())
}
