//! The lane-following vehicle controller.
//!
//! Each tick a vehicle plans a target speed, integrates its speed toward
//! it, advances its cursor, then steers.  Planning starts from cruise speed
//! and applies three overrides in priority order, each of which may only
//! lower the target:
//!
//! 1. yield to a crosswalk ahead that says vehicles must stop,
//! 2. keep a speed-dependent gap to the leader,
//! 3. (transit only) pull in and dwell at the next stop.

use st_core::{AgentRng, GateId, PathId, StopId, VehicleId, Vec2};
use st_lane::{CursorStep, LaneNetwork, PathCursor};
use st_signal::VehiclePhase;

use crate::{VehicleConfig, VehicleContext, VehicleSnapshot, following_cap};

/// Transit dwell progress.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum DwellState {
    #[default]
    Moving,
    Dwelling { stop: StopId, until: f64 },
}

/// The signalised crosswalk a vehicle is currently approaching.
#[derive(Copy, Clone, Debug, PartialEq)]
struct TrackedGate {
    gate:      GateId,
    /// Phase was green on the previous tick.
    was_green: bool,
}

// ── VehicleAgent ──────────────────────────────────────────────────────────────

/// One vehicle.
///
/// A vehicle whose lane path cannot be resolved is built *inert*: it has no
/// cursor, is never moved, and is invisible to pedestrians and followers.
#[derive(Clone, Debug)]
pub struct VehicleAgent {
    id:           VehicleId,
    transit:      bool,
    cursor:       Option<PathCursor>,
    pos:          Vec2,
    heading:      Vec2,
    speed:        f32,
    target_speed: f32,
    finished:     bool,

    dwell:        DwellState,
    cooldowns:    Vec<(StopId, f64)>,

    tracked:      Option<TrackedGate>,
    grace_left:   f32,

    rng:          AgentRng,
}

impl VehicleAgent {
    /// Place a vehicle at `cursor`.
    ///
    /// Logs a warning and returns an inert vehicle if the path is unknown.
    pub fn on_path(id: VehicleId, cursor: PathCursor, transit: bool, lanes: &LaneNetwork, seed: u64) -> Self {
        let rng = AgentRng::for_vehicle(seed, id);
        let Some(path) = lanes.get(cursor.path) else {
            log::warn!("{id} assigned to missing lane path {}; vehicle is inert", cursor.path);
            return Self::build(id, transit, None, Vec2::ZERO, Vec2::FORWARD, rng);
        };
        let distance = cursor.distance.min(path.length());
        Self::build(
            id,
            transit,
            Some(PathCursor::new(path.id(), distance)),
            path.point_at(distance),
            path.direction_at(distance),
            rng,
        )
    }

    /// Drop a hand-placed vehicle onto the lane whose start is nearest to
    /// `pos`, projected onto the closest segment running along `heading`.
    ///
    /// With no lanes at all the vehicle stays where it was put, inert.
    pub fn placed(
        id:      VehicleId,
        pos:     Vec2,
        heading: Vec2,
        transit: bool,
        lanes:   &LaneNetwork,
        config:  &VehicleConfig,
        seed:    u64,
    ) -> Self {
        let Some(path) = lanes.nearest_start(pos).and_then(|p| lanes.get(p)) else {
            log::warn!("{id} placed at {pos} with no lane paths in the scene; vehicle is inert");
            let rng = AgentRng::for_vehicle(seed, id);
            return Self::build(id, transit, None, pos, heading.normalized_or(Vec2::FORWARD), rng);
        };
        let distance = path.project(pos, heading, config.spawn_min_forward_dot).unwrap_or(0.0);
        Self::on_path(id, PathCursor::new(path.id(), distance), transit, lanes, seed)
    }

    fn build(
        id:      VehicleId,
        transit: bool,
        cursor:  Option<PathCursor>,
        pos:     Vec2,
        heading: Vec2,
        rng:     AgentRng,
    ) -> Self {
        Self {
            id,
            transit,
            cursor,
            pos,
            heading,
            speed: 0.0,
            target_speed: 0.0,
            finished: false,
            dwell: DwellState::Moving,
            cooldowns: Vec::new(),
            tracked: None,
            grace_left: 0.0,
            rng,
        }
    }

    /// Start at `speed` instead of standing still.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn is_transit(&self) -> bool {
        self.transit
    }

    pub fn is_inert(&self) -> bool {
        self.cursor.is_none()
    }

    /// Ran off the end of a dead-end path; the simulation despawns it.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Neither inert nor finished.
    pub fn is_live(&self) -> bool {
        !self.finished && self.cursor.is_some()
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn heading(&self) -> Vec2 {
        self.heading
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// The target chosen by the last plan.
    pub fn target_speed(&self) -> f32 {
        self.target_speed
    }

    pub fn cursor(&self) -> Option<PathCursor> {
        self.cursor
    }

    pub fn path(&self) -> Option<PathId> {
        self.cursor.map(|c| c.path)
    }

    pub fn dwell(&self) -> DwellState {
        self.dwell
    }

    /// Seconds of junction grace left.
    pub fn grace_remaining(&self) -> f32 {
        self.grace_left
    }

    pub fn in_cooldown(&self, stop: StopId) -> bool {
        self.cooldowns.iter().any(|&(s, _)| s == stop)
    }

    /// What followers see of this vehicle; `None` unless live.
    pub fn snapshot(&self) -> Option<VehicleSnapshot> {
        let cursor = self.cursor.filter(|_| !self.finished)?;
        Some(VehicleSnapshot {
            id:       self.id,
            pos:      self.pos,
            heading:  self.heading,
            speed:    self.speed,
            path:     cursor.path,
            distance: cursor.distance,
        })
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance one tick.  Returns `None` for inert or finished vehicles.
    pub fn tick(&mut self, ctx: &VehicleContext<'_>) -> Option<CursorStep> {
        if !self.is_live() {
            return None;
        }

        let target = self.plan(ctx);
        self.target_speed = target;
        let step = self.integrate(target, ctx);
        self.update_grace(ctx);

        if step == CursorStep::Finished {
            log::trace!("{} reached the end of its route at {}", self.id, self.pos);
            self.finished = true;
        }
        Some(step)
    }

    // ── Planning ──────────────────────────────────────────────────────────

    fn plan(&mut self, ctx: &VehicleContext<'_>) -> f32 {
        let cfg = ctx.config;
        let mut target = cfg.cruise_speed;

        if self.grace_left <= 0.0 && self.gate_ahead_says_stop(ctx) {
            target = 0.0;
        }

        if let Some(me) = self.snapshot() {
            if let Some(leader) = ctx.leaders.leader_for(&me, cfg) {
                target = target.min(following_cap(self.speed, &leader, cfg));
            }
        }

        if self.transit {
            target = target.min(self.plan_dwell(ctx));
        }

        target.max(0.0)
    }

    fn gate_ahead_says_stop(&self, ctx: &VehicleContext<'_>) -> bool {
        let cfg = ctx.config;
        ctx.gates.iter().any(|zone| {
            let to = zone.pos - self.pos;
            let d = to.length();
            d > f32::EPSILON
                && d <= cfg.gate_lookahead
                && self.heading.dot(to * (1.0 / d)) >= cfg.gate_forward_dot
                && zone.should_vehicles_stop(ctx.now)
        })
    }

    /// Speed limit imposed by the next stop; unbounded when there is none.
    fn plan_dwell(&mut self, ctx: &VehicleContext<'_>) -> f32 {
        let cfg = ctx.config;
        let now = ctx.now;
        self.cooldowns.retain(|&(_, until)| until > now);

        if let DwellState::Dwelling { stop, until } = self.dwell {
            if now < until {
                return 0.0;
            }
            log::trace!("{} leaving {stop}", self.id);
            self.cooldowns.push((stop, now + cfg.stop_cooldown_secs));
            self.dwell = DwellState::Moving;
        }

        let next = ctx
            .stops
            .iter()
            .filter(|s| !self.in_cooldown(s.id))
            .filter_map(|s| s.approach_distance(self.pos, self.heading).map(|d| (s.id, d)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((stop, d)) = next else {
            return f32::INFINITY;
        };

        if d <= cfg.stop_tolerance {
            if self.speed < cfg.stopped_speed {
                log::trace!("{} dwelling at {stop}", self.id);
                self.dwell = DwellState::Dwelling { stop, until: now + cfg.dwell_secs };
            }
            return 0.0;
        }
        cfg.cruise_speed * (d / cfg.stop_approach.max(0.01)).clamp(0.0, 1.0)
    }

    // ── Integration ───────────────────────────────────────────────────────

    fn integrate(&mut self, target: f32, ctx: &VehicleContext<'_>) -> CursorStep {
        let cfg = ctx.config;
        let dt = ctx.dt;
        let speed = if target > self.speed {
            (self.speed + cfg.accel * dt).min(target)
        } else {
            (self.speed - cfg.decel * dt).max(target)
        };
        self.speed = speed.max(0.0);

        let Some(mut cursor) = self.cursor else {
            return CursorStep::Finished;
        };
        let step = cursor.advance(ctx.lanes, self.speed * dt, &mut self.rng);
        self.cursor = Some(cursor);

        if let Some(p) = cursor.position(ctx.lanes) {
            self.pos = p;
        }
        let along = cursor.direction(ctx.lanes).unwrap_or(self.heading);
        let aim = cursor
            .point_ahead(ctx.lanes, cfg.heading_lookahead)
            .map_or(along, |a| (a - self.pos).normalized_or(along));
        self.heading = self.heading.rotate_towards(aim, cfg.max_turn_rate * dt);
        step
    }

    /// Arm junction grace when the tracked signalised gate drops behind the
    /// vehicle after having been green.
    fn update_grace(&mut self, ctx: &VehicleContext<'_>) {
        let cfg = ctx.config;
        self.grace_left = (self.grace_left - ctx.dt).max(0.0);

        if let Some(tracked) = self.tracked {
            self.tracked = ctx.gates.get(tracked.gate).and_then(|zone| {
                let align = self.heading.dot((zone.pos - self.pos).normalized_or(Vec2::ZERO));
                if align > 0.0 {
                    return Some(TrackedGate {
                        gate:      tracked.gate,
                        was_green: zone.vehicle_phase(ctx.now) == Some(VehiclePhase::Green),
                    });
                }
                if tracked.was_green {
                    log::trace!("{} cleared {} on green; grace armed", self.id, tracked.gate);
                    self.grace_left = cfg.junction_grace_secs;
                }
                None
            });
        }

        if self.tracked.is_none() {
            let reach = 2.0 * cfg.gate_lookahead;
            self.tracked = ctx
                .gates
                .iter()
                .filter_map(|zone| {
                    let phase = zone.vehicle_phase(ctx.now)?;
                    let to = zone.pos - self.pos;
                    let d = to.length();
                    (d > f32::EPSILON && d <= reach && self.heading.dot(to) > 0.0).then_some((zone.id(), phase, d))
                })
                .min_by(|a, b| a.2.total_cmp(&b.2))
                .map(|(gate, phase, _)| TrackedGate { gate, was_green: phase == VehiclePhase::Green });
        }
    }
}
