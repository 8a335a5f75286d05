//! The pedestrian state machine.
//!
//! ```text
//!            gate open / jaywalk              far curb reached
//!   Wander ───────────────────────► Crossing ────────────────────► Wander
//!     │  ▲
//!     │  └──────────── arrest / forgotten ──────────┐
//!     └── visible violation (Enforcer only) ──► Chase
//! ```
//!
//! Every wait is an early return checked once per tick: idling compares
//! `idle_until` with `now`, walking compares the remaining distance with the
//! arrival radius.

use st_core::{AgentRng, GateId, NodeId, PedId, Vec2};
use st_nav::{CandidateQuery, CrossingLock, LockScope, NodeGraph, NodeKind};
use st_signal::{CrosswalkZone, GateSet};

use crate::{
    PedConfig, PedContext, PedEvent, PedRole, PedState, SubscriptionId, Violation,
    ViolationInbox, ViolationReason, can_see,
};

// ── Per-state data ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
struct WalkTarget {
    node: NodeId,
    dest: Vec2,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct CrossingLeg {
    /// Gate notified at the start, if any.
    gate: Option<GateId>,
    from: NodeId,
    far:  Option<NodeId>,
    dest: Vec2,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct ChaseTarget {
    offender:      PedId,
    last_seen_pos: Vec2,
    last_seen_at:  f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Activity {
    Wander(Option<WalkTarget>),
    Crossing(CrossingLeg),
    Chase(ChaseTarget),
}

// ── Pedestrian ────────────────────────────────────────────────────────────────

/// One pedestrian agent.
///
/// Owns its node references, claim, crossing history, and RNG.  Shared
/// resources (claims, gate occupancy) are only touched through the
/// `NodeGraph` and `GateSet` borrowed from the tick context.
#[derive(Debug)]
pub struct Pedestrian {
    id:               PedId,
    role:             PedRole,
    pos:              Vec2,
    facing:           Vec2,
    speed_multiplier: f32,
    speed:            f32,
    walking:          bool,

    current:          Option<NodeId>,
    last:             Option<NodeId>,
    claimed:          Option<(NodeId, u32)>,
    /// Crossing node where the last attempt was abandoned; skipped until the
    /// pedestrian moves on.
    declined:         Option<NodeId>,

    lock:             CrossingLock,
    idle_until:       f64,
    activity:         Activity,
    rng:              AgentRng,

    inbox:            Option<ViolationInbox>,
    subscription:     Option<SubscriptionId>,
}

impl Pedestrian {
    /// Create a pedestrian at `pos`.  The per-agent speed multiplier is drawn
    /// from `config.speed_multiplier_range`.
    pub fn new(id: PedId, role: PedRole, pos: Vec2, facing: Vec2, seed: u64, config: &PedConfig) -> Self {
        let mut rng = AgentRng::for_pedestrian(seed, id);
        let (lo, hi) = config.speed_multiplier_range;
        let speed_multiplier = rng.range_f32(lo, hi).max(0.1);
        Self {
            id,
            role,
            pos,
            facing: facing.normalized_or(Vec2::FORWARD),
            speed_multiplier,
            speed: 0.0,
            walking: false,
            current: None,
            last: None,
            claimed: None,
            declined: None,
            lock: CrossingLock::new(),
            idle_until: f64::NEG_INFINITY,
            activity: Activity::Wander(None),
            rng,
            inbox: None,
            subscription: None,
        }
    }

    /// Adopt the nearest node within `radius` as the current node.
    pub fn snap_to_graph(&mut self, graph: &NodeGraph, radius: f32) -> Option<NodeId> {
        self.current = graph.nearest(self.pos, radius);
        self.current
    }

    /// Give an enforcer its violation inbox and the bus subscription that
    /// feeds it.
    pub fn attach_inbox(&mut self, inbox: ViolationInbox, subscription: SubscriptionId) {
        self.inbox = Some(inbox);
        self.subscription = Some(subscription);
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> PedId {
        self.id
    }

    #[inline]
    pub fn role(&self) -> PedRole {
        self.role
    }

    pub fn state(&self) -> PedState {
        match self.activity {
            Activity::Wander(_) => PedState::Wander,
            Activity::Crossing(_) => PedState::Crossing,
            Activity::Chase(_) => PedState::Chase,
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    /// Speed over the last tick, m/s.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_walking(&self) -> bool {
        self.walking
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn current_node(&self) -> Option<NodeId> {
        self.current
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.last
    }

    /// The node this pedestrian holds a claim on, with its slot index.
    pub fn claimed(&self) -> Option<(NodeId, u32)> {
        self.claimed
    }

    pub fn crossing_lock(&self) -> &CrossingLock {
        &self.lock
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    /// The offender being chased, if any.
    pub fn chase_target(&self) -> Option<PedId> {
        match self.activity {
            Activity::Chase(c) => Some(c.offender),
            _ => None,
        }
    }

    /// The gate this pedestrian is on, if mid-crossing.
    pub fn crossing_gate(&self) -> Option<GateId> {
        match self.activity {
            Activity::Crossing(leg) => leg.gate,
            _ => None,
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance this pedestrian by one tick.
    pub fn tick(&mut self, ctx: &PedContext<'_>) -> Vec<PedEvent> {
        let mut events = Vec::new();
        let before = self.pos;
        self.walking = false;

        if self.role == PedRole::Enforcer {
            self.check_reports(ctx, &mut events);
        }

        match self.activity {
            Activity::Wander(target) => self.tick_wander(target, ctx, &mut events),
            Activity::Crossing(leg) => self.tick_crossing(leg, ctx, &mut events),
            Activity::Chase(chase) => self.tick_chase(chase, ctx, &mut events),
        }

        self.speed = if ctx.dt > 0.0 { before.distance(self.pos) / ctx.dt } else { 0.0 };
        events
    }

    /// Release every shared resource this pedestrian holds: its node claim
    /// and, if mid-crossing, its gate occupancy.  Leaves it wandering with no
    /// target.  Must be called before the pedestrian is dropped.
    pub fn release_all(&mut self, graph: &NodeGraph, gates: &GateSet) {
        self.release_claim(graph);
        if let Activity::Crossing(leg) = self.activity {
            end_gate(gates, leg.gate);
        }
        self.activity = Activity::Wander(None);
        self.walking = false;
    }

    // ── Wander ────────────────────────────────────────────────────────────

    fn tick_wander(&mut self, target: Option<WalkTarget>, ctx: &PedContext<'_>, events: &mut Vec<PedEvent>) {
        if self.idle_until > ctx.now {
            return;
        }

        if let Some(t) = target {
            let speed = ctx.config.walk_speed * self.speed_multiplier;
            if self.walk_towards(t.dest, speed, ctx) <= ctx.config.arrival_radius {
                self.arrive_at(t.node, ctx);
            }
            return;
        }

        if self.current.is_none() {
            self.current = ctx.graph.nearest(self.pos, ctx.config.reacquire_radius);
        }

        if let Some(cur) = self.current {
            if self.should_consider_crossing(cur, ctx) {
                self.evaluate_crossing(cur, ctx, events);
                return;
            }
        }

        self.pick_next(ctx, events);
    }

    fn should_consider_crossing(&self, cur: NodeId, ctx: &PedContext<'_>) -> bool {
        let graph = ctx.graph;
        graph.is_crossing(cur)
            && self.declined != Some(cur)
            && self.last != Some(cur)
            && !self.last.is_some_and(|l| graph.are_opposite_crossing_sides(l, cur))
            && ctx.now >= self.lock_until(ctx)
    }

    fn evaluate_crossing(&mut self, cur: NodeId, ctx: &PedContext<'_>, events: &mut Vec<PedEvent>) {
        let gate_id = ctx.graph.node_group(cur).and_then(|g| ctx.graph.group_gate(g));
        let zone = gate_id.and_then(|g| ctx.gates.get(g));
        let legal = zone.is_none_or(|z| z.can_pedestrian_start_crossing(ctx.now, ctx.vehicles));

        if legal {
            self.begin_crossing(cur, zone, false, ctx, events);
        } else if self.role == PedRole::Abnormal {
            self.begin_crossing(cur, zone, true, ctx, events);
        } else if let Some(z) = zone {
            // Wait at the curb facing the road.
            self.facing = (z.pos - self.pos).normalized_or(self.facing);
        }
    }

    fn pick_next(&mut self, ctx: &PedContext<'_>, events: &mut Vec<PedEvent>) {
        let graph = ctx.graph;
        let cfg = ctx.config;
        self.release_claim(graph);

        let radius = self
            .current
            .and_then(|n| graph.node(n))
            .map_or(cfg.default_search_radius, |n| n.radius_hint);
        let on_crossing = self.current.is_some_and(|n| graph.is_crossing(n));
        let query = CandidateQuery {
            pos:         self.pos,
            forward:     self.facing,
            radius,
            last:        self.last,
            on_crossing,
            min_dot:     cfg.node_min_dot,
            now:         ctx.now,
            lock_until:  self.lock_until(ctx),
        };
        let mut list = graph.pick_candidates(&query, &cfg.retry);
        // The far curb is only reached through the Crossing state.
        if let Some(partner) = self.current.and_then(|n| graph.partner(n)) {
            list.retain(|&n| n != partner);
        }

        let tries = cfg.max_pick_tries.min(list.len());
        for _ in 0..tries {
            let Some(&node) = self.rng.choose(&list) else { break };
            let Some(slot) = graph.try_claim(node) else { continue };
            let Some(node_data) = graph.node(node) else {
                graph.release(node);
                continue;
            };
            if !ctx.surface.path_exists(self.pos, node_data.pos) {
                graph.release(node);
                continue;
            }

            self.claimed = Some((node, slot));
            let approach = (node_data.pos - self.pos).normalized_or(self.facing);
            let mut dest = node_data.pos + self.rng.inside_unit_circle() * cfg.arrival_jitter;
            if node_data.kind == NodeKind::BusStop {
                dest += approach * (cfg.bus_stop_slot_spacing * slot as f32);
            }
            self.facing = (dest - self.pos).normalized_or(self.facing);
            self.activity = Activity::Wander(Some(WalkTarget { node, dest }));
            log::trace!("{} heading to {node} (slot {slot})", self.id);
            return;
        }

        log::debug!("{} found no node to walk to from {:?}", self.id, self.current);
        events.push(PedEvent::PickFailed { at: self.current });
        self.idle_for(cfg.idle_range, ctx.now);
    }

    fn arrive_at(&mut self, node: NodeId, ctx: &PedContext<'_>) {
        self.last = self.current;
        self.current = Some(node);
        self.declined = None;
        self.activity = Activity::Wander(None);

        let cfg = ctx.config;
        let mut pause = f64::from(self.rng.range_f32(cfg.idle_range.0, cfg.idle_range.1));
        if ctx.graph.node(node).is_some_and(|n| n.kind == NodeKind::BusStop) {
            pause += f64::from(self.rng.range_f32(cfg.bus_stop_extra_idle.0, cfg.bus_stop_extra_idle.1));
        }
        self.idle_until = ctx.now + pause;
    }

    // ── Crossing ──────────────────────────────────────────────────────────

    fn begin_crossing(
        &mut self,
        cur:     NodeId,
        zone:    Option<&CrosswalkZone>,
        jaywalk: bool,
        ctx:     &PedContext<'_>,
        events:  &mut Vec<PedEvent>,
    ) {
        let graph = ctx.graph;
        let far = graph.partner(cur);
        let raw_target = match far {
            Some(p) => graph.pos(p),
            None => zone.map(|z| {
                let approach = (z.pos - self.pos).normalized_or(self.facing);
                z.pos + approach * (z.pos.distance(self.pos) + ctx.config.far_curb_overshoot)
            }),
        };

        let Some(dest) = raw_target.and_then(|t| ctx.surface.project(t)) else {
            log::debug!("{} abandoned crossing at {cur}: far curb is off the walkable surface", self.id);
            events.push(PedEvent::CrossingAbandoned { node: cur });
            self.declined = Some(cur);
            self.idle_for((ctx.config.idle_range.0, ctx.config.idle_range.0), ctx.now);
            return;
        };

        self.release_claim(graph);
        if let Some(p) = far {
            self.claimed = graph.try_claim(p).map(|slot| (p, slot));
        }
        let gate = zone.map(|z| {
            z.notify_pedestrian_start();
            z.id()
        });

        if jaywalk {
            events.push(PedEvent::Violation(Violation {
                offender: self.id,
                reason:   ViolationReason::Jaywalk,
                pos:      self.pos,
                time:     ctx.now,
            }));
        }
        events.push(PedEvent::CrossingStarted { node: cur, gate });

        self.facing = (dest - self.pos).normalized_or(self.facing);
        self.activity = Activity::Crossing(CrossingLeg { gate, from: cur, far, dest });
    }

    fn tick_crossing(&mut self, leg: CrossingLeg, ctx: &PedContext<'_>, events: &mut Vec<PedEvent>) {
        let speed = ctx.config.walk_speed * self.speed_multiplier;
        if self.walk_towards(leg.dest, speed, ctx) > ctx.config.arrival_radius {
            return;
        }

        end_gate(ctx.gates, leg.gate);
        if ctx.config.lock_scope == LockScope::PerAgent && self.lock.record(ctx.now, &ctx.config.lock) {
            log::debug!("{} locked out of crossings until {:.1}", self.id, self.lock.lock_until());
        }
        self.release_claim(ctx.graph);
        events.push(PedEvent::CrossingFinished { gate: leg.gate, far: leg.far });

        self.last = Some(leg.from);
        self.current = leg.far;
        self.declined = None;
        self.activity = Activity::Wander(None);
        self.idle_for(ctx.config.idle_range, ctx.now);
    }

    // ── Chase ─────────────────────────────────────────────────────────────

    /// Drain the inbox; a visible offender starts a chase unless one is
    /// already running.
    fn check_reports(&mut self, ctx: &PedContext<'_>, events: &mut Vec<PedEvent>) {
        let Some(inbox) = &self.inbox else { return };
        let reports = inbox.drain();
        if matches!(self.activity, Activity::Chase(_)) {
            return;
        }

        for report in reports {
            if report.offender == self.id {
                continue;
            }
            let Some(seen_at) = ctx.positions.position_of(report.offender) else { continue };
            if !can_see(self.pos, self.facing, seen_at, ctx.config, ctx.sight) {
                log::trace!("{} cannot see {} at {seen_at}", self.id, report.offender);
                continue;
            }

            self.release_all(ctx.graph, ctx.gates);
            self.idle_until = f64::NEG_INFINITY;
            self.activity = Activity::Chase(ChaseTarget {
                offender:      report.offender,
                last_seen_pos: seen_at,
                last_seen_at:  ctx.now,
            });
            log::debug!("{} chasing {} seen at {seen_at}", self.id, report.offender);
            events.push(PedEvent::ChaseStarted { offender: report.offender });
            return;
        }
    }

    fn tick_chase(&mut self, mut chase: ChaseTarget, ctx: &PedContext<'_>, events: &mut Vec<PedEvent>) {
        let cfg = ctx.config;
        let offender_pos = ctx.positions.position_of(chase.offender);

        if let Some(p) = offender_pos.filter(|&p| can_see(self.pos, self.facing, p, cfg, ctx.sight)) {
            chase.last_seen_pos = p;
            chase.last_seen_at = ctx.now;
        }

        if offender_pos.is_some_and(|p| p.distance(self.pos) <= cfg.arrest_distance) {
            log::debug!("{} arrested {}", self.id, chase.offender);
            events.push(PedEvent::Arrested { offender: chase.offender });
            self.end_chase(ctx);
            return;
        }

        let forgotten = ctx.now - chase.last_seen_at > cfg.forget_secs;
        let at_last_seen = self.pos.distance(chase.last_seen_pos) <= cfg.arrival_radius;
        if forgotten && (at_last_seen || offender_pos.is_none()) {
            log::debug!("{} lost {}", self.id, chase.offender);
            events.push(PedEvent::ChaseAbandoned { offender: chase.offender });
            self.end_chase(ctx);
            return;
        }

        let speed = cfg.walk_speed * self.speed_multiplier * cfg.chase_speed_multiplier;
        self.walk_towards(chase.last_seen_pos, speed, ctx);
        self.activity = Activity::Chase(chase);
    }

    fn end_chase(&mut self, ctx: &PedContext<'_>) {
        self.activity = Activity::Wander(None);
        self.last = None;
        self.declined = None;
        self.current = ctx.graph.nearest(self.pos, ctx.config.reacquire_radius);
        self.idle_for(ctx.config.idle_range, ctx.now);
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// Step toward `dest`; returns the remaining distance.
    fn walk_towards(&mut self, dest: Vec2, speed: f32, ctx: &PedContext<'_>) -> f32 {
        let to = dest - self.pos;
        if to.length_sq() > 0.0 {
            self.facing = to.normalized_or(self.facing);
        }
        self.pos = self.pos.move_towards(dest, speed * ctx.dt);
        self.walking = true;
        self.pos.distance(dest)
    }

    fn idle_for(&mut self, range: (f32, f32), now: f64) {
        self.idle_until = now + f64::from(self.rng.range_f32(range.0, range.1));
    }

    fn release_claim(&mut self, graph: &NodeGraph) {
        if let Some((node, _)) = self.claimed.take() {
            graph.release(node);
        }
    }

    fn lock_until(&self, ctx: &PedContext<'_>) -> f64 {
        match (ctx.config.lock_scope, ctx.global_lock) {
            (LockScope::Global, Some(global)) => global.lock_until(),
            _ => self.lock.lock_until(),
        }
    }
}

fn end_gate(gates: &GateSet, gate: Option<GateId>) {
    if let Some(z) = gate.and_then(|g| gates.get(g)) {
        z.notify_pedestrian_end();
    }
}
