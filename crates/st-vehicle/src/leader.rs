//! Per-tick vehicle snapshot used for car following.

use st_core::{PathId, VehicleId, Vec2};

use crate::VehicleConfig;

/// What other vehicles can see of one vehicle at the start of a tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleSnapshot {
    pub id:       VehicleId,
    pub pos:      Vec2,
    pub heading:  Vec2,
    pub speed:    f32,
    pub path:     PathId,
    /// Arc length along `path`.
    pub distance: f32,
}

/// The vehicle a follower keeps its gap to.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Leader {
    pub id:    VehicleId,
    /// Along-path distance for a same-path leader, straight-line otherwise.
    pub gap:   f32,
    pub speed: f32,
}

/// Every live vehicle at the start of the tick.
///
/// Built once before the vehicle phase so every vehicle plans against the
/// same frozen picture regardless of update order.
#[derive(Clone, Debug, Default)]
pub struct LeaderSnapshot {
    entries: Vec<VehicleSnapshot>,
}

impl LeaderSnapshot {
    pub fn new(entries: Vec<VehicleSnapshot>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: VehicleSnapshot) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleSnapshot> + '_ {
        self.entries.iter()
    }

    /// The vehicle `me` should follow.
    ///
    /// Prefers the nearest vehicle further along the same path.  Failing
    /// that, the nearest vehicle inside a narrow forward probe, which covers
    /// leaders that have already turned onto the next path.
    pub fn leader_for(&self, me: &VehicleSnapshot, config: &VehicleConfig) -> Option<Leader> {
        let same_path = self
            .entries
            .iter()
            .filter(|o| o.id != me.id && o.path == me.path)
            .map(|o| (o, o.distance - me.distance))
            .filter(|&(_, delta)| delta > 0.0)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((o, gap)) = same_path {
            return Some(Leader { id: o.id, gap, speed: o.speed });
        }

        let fwd = me.heading.normalized_or(Vec2::FORWARD);
        let side = fwd.perp();
        self.entries
            .iter()
            .filter(|o| o.id != me.id)
            .filter_map(|o| {
                let to = o.pos - me.pos;
                let d = to.length();
                let inside = d > f32::EPSILON
                    && d <= config.follow_probe
                    && fwd.dot(to * (1.0 / d)) >= config.follow_probe_dot
                    && to.dot(side).abs() <= config.probe_half_width;
                inside.then_some((o, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(o, gap)| Leader { id: o.id, gap, speed: o.speed })
    }
}

/// Speed cap that keeps a safe gap to `leader`.
///
/// The desired gap grows with speed; inside it the follower must stop,
/// outside it the cap blends from the leader's speed upward.
pub fn following_cap(speed: f32, leader: &Leader, config: &VehicleConfig) -> f32 {
    let desired = config.min_gap.max(speed * config.time_headway);
    if leader.gap < desired {
        0.0
    } else {
        leader.speed + (leader.gap - desired) / config.time_headway.max(f32::EPSILON)
    }
}
