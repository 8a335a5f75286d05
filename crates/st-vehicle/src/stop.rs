//! Transit stop markers.

use st_core::{StopId, Vec2};

pub const DEFAULT_STOP_TRIGGER_RADIUS: f32 = 6.0;
pub const DEFAULT_STOP_LATERAL_TOLERANCE: f32 = 3.0;

/// A kerbside stop that transit vehicles dwell at.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopMarker {
    pub id:                StopId,
    pub pos:               Vec2,
    /// Travel direction the stop serves; vehicles heading the other way
    /// ignore it.
    pub facing:            Vec2,
    pub trigger_radius:    f32,
    /// Maximum sideways offset between the vehicle's line of travel and the
    /// stop.
    pub lateral_tolerance: f32,
}

impl StopMarker {
    pub fn new(id: StopId, pos: Vec2, facing: Vec2) -> Self {
        Self {
            id,
            pos,
            facing: facing.normalized_or(Vec2::FORWARD),
            trigger_radius: DEFAULT_STOP_TRIGGER_RADIUS,
            lateral_tolerance: DEFAULT_STOP_LATERAL_TOLERANCE,
        }
    }

    pub fn with_trigger_radius(mut self, radius: f32) -> Self {
        self.trigger_radius = radius;
        self
    }

    pub fn with_lateral_tolerance(mut self, tolerance: f32) -> Self {
        self.lateral_tolerance = tolerance;
        self
    }

    /// Along-track distance to this stop if a vehicle at `pos` heading along
    /// `heading` should treat it as its next stop.
    ///
    /// The sideways offset of a kerbside stop does not count: a vehicle
    /// alongside the stop is at distance zero.
    pub fn approach_distance(&self, pos: Vec2, heading: Vec2) -> Option<f32> {
        let heading = heading.normalized_or(Vec2::FORWARD);
        let to = self.pos - pos;
        let d = to.length();
        let ahead = to.dot(heading);
        let lateral = to.dot(heading.perp()).abs();
        (d <= self.trigger_radius
            && ahead > 0.0
            && lateral <= self.lateral_tolerance
            && self.facing.dot(heading) > 0.0)
            .then_some(ahead)
    }
}
