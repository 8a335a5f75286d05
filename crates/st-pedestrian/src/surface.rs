//! Walkable-surface queries.

use st_core::Vec2;

/// The walkable area pedestrians move on.
pub trait NavSurface: Sync {
    /// Can a pedestrian walk from `from` to `to`?
    fn path_exists(&self, from: Vec2, to: Vec2) -> bool;

    /// Snap `pos` onto the walkable surface, or `None` if it is off-surface.
    fn project(&self, pos: Vec2) -> Option<Vec2>;
}

/// Everywhere is walkable.
#[derive(Copy, Clone, Debug, Default)]
pub struct OpenSurface;

impl NavSurface for OpenSurface {
    fn path_exists(&self, _from: Vec2, _to: Vec2) -> bool {
        true
    }

    fn project(&self, pos: Vec2) -> Option<Vec2> {
        Some(pos)
    }
}

/// An axis-aligned walkable rectangle.
///
/// Points within `snap_distance` outside the rectangle project onto its edge;
/// anything farther is off-surface.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RectSurface {
    pub min:           Vec2,
    pub max:           Vec2,
    pub snap_distance: f32,
}

impl RectSurface {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max, snap_distance: 1.0 }
    }

    fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x.clamp(self.min.x, self.max.x), pos.y.clamp(self.min.y, self.max.y))
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        self.clamp(pos) == pos
    }
}

impl NavSurface for RectSurface {
    fn path_exists(&self, from: Vec2, to: Vec2) -> bool {
        // Convex: any two inside points are connected.
        self.contains(from) && self.contains(to)
    }

    fn project(&self, pos: Vec2) -> Option<Vec2> {
        let snapped = self.clamp(pos);
        (snapped.distance(pos) <= self.snap_distance).then_some(snapped)
    }
}
