//! What an enforcer can see.

use st_core::{Segment, Vec2};

use crate::PedConfig;

/// Occlusion test between two points.
///
/// The simulation has no physics engine; scenes plug in whatever blocks
/// sight lines (buildings, parked buses).
pub trait LineOfSightProvider: Sync {
    fn is_blocked(&self, from: Vec2, to: Vec2) -> bool;
}

impl<F> LineOfSightProvider for F
where
    F: Fn(Vec2, Vec2) -> bool + Sync,
{
    fn is_blocked(&self, from: Vec2, to: Vec2) -> bool {
        self(from, to)
    }
}

/// Nothing ever blocks sight.
#[derive(Copy, Clone, Debug, Default)]
pub struct OpenSky;

impl LineOfSightProvider for OpenSky {
    fn is_blocked(&self, _from: Vec2, _to: Vec2) -> bool {
        false
    }
}

/// Opaque wall segments.
#[derive(Clone, Debug, Default)]
pub struct Occluders {
    pub walls: Vec<Segment>,
}

impl Occluders {
    pub fn new(walls: Vec<Segment>) -> Self {
        Self { walls }
    }
}

impl LineOfSightProvider for Occluders {
    fn is_blocked(&self, from: Vec2, to: Vec2) -> bool {
        let ray = Segment::new(from, to);
        self.walls.iter().any(|w| w.intersects(&ray))
    }
}

/// `true` iff `target` is within view distance, inside the field-of-view
/// cone around `facing`, and not occluded.
pub fn can_see(
    observer: Vec2,
    facing:   Vec2,
    target:   Vec2,
    config:   &PedConfig,
    sight:    &dyn LineOfSightProvider,
) -> bool {
    let to = target - observer;
    let dist = to.length();
    if dist > config.view_distance {
        return false;
    }
    if dist > f32::EPSILON {
        let half_fov = (config.view_fov_degrees * 0.5).to_radians();
        let cos = facing.normalized_or(Vec2::FORWARD).dot(to * (1.0 / dist));
        if cos < half_fov.cos() {
            return false;
        }
    }
    !sight.is_blocked(observer, target)
}
