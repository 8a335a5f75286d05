//! Distance-based progress along a lane network.

use st_core::{AgentRng, PathId, Vec2};

use crate::{LaneNetwork, LanePath};

/// What happened during one [`PathCursor::advance`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CursorStep {
    /// Still on the same path.
    Moved,
    /// Ran off the end of `from` and onto `to`.
    Continued { from: PathId, to: PathId },
    /// Wrapped back to the start of a looping path.
    Looped,
    /// Reached the end of a dead-end path (or the path vanished).
    Finished,
}

/// A position on the lane network expressed as `(path, arc length)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathCursor {
    pub path:     PathId,
    pub distance: f32,
}

impl PathCursor {
    pub fn new(path: PathId, distance: f32) -> Self {
        Self { path, distance: distance.max(0.0) }
    }

    pub fn at_start(path: PathId) -> Self {
        Self::new(path, 0.0)
    }

    /// Move forward by `delta` metres.
    ///
    /// At the end of the path the cursor continues onto a random `next`
    /// path, else wraps if the path loops, else stops and reports
    /// `Finished`.  Overflow past the end is carried onto the new path.
    pub fn advance(&mut self, lanes: &LaneNetwork, delta: f32, rng: &mut AgentRng) -> CursorStep {
        let Some(path) = lanes.get(self.path) else {
            return CursorStep::Finished;
        };
        self.distance += delta.max(0.0);
        let len = path.length();
        if self.distance < len {
            return CursorStep::Moved;
        }

        let overflow = self.distance - len;
        if let Some(next) = path.pick_next(rng) {
            let from = self.path;
            self.path = next;
            self.distance = overflow.min(lanes.get(next).map_or(0.0, LanePath::length));
            CursorStep::Continued { from, to: next }
        } else if path.loop_at_end {
            self.distance = overflow % len;
            CursorStep::Looped
        } else {
            self.distance = len;
            CursorStep::Finished
        }
    }

    /// World position of the cursor.
    pub fn position(&self, lanes: &LaneNetwork) -> Option<Vec2> {
        lanes.get(self.path).map(|p| p.point_at(self.distance))
    }

    /// Travel direction at the cursor.
    pub fn direction(&self, lanes: &LaneNetwork) -> Option<Vec2> {
        lanes.get(self.path).map(|p| p.direction_at(self.distance))
    }

    /// Point `lookahead` metres further along the current path, clamped to
    /// its end.
    pub fn point_ahead(&self, lanes: &LaneNetwork, lookahead: f32) -> Option<Vec2> {
        lanes.get(self.path).map(|p| p.point_at(self.distance + lookahead))
    }

    /// Metres left on the current path.
    pub fn remaining(&self, lanes: &LaneNetwork) -> f32 {
        lanes.get(self.path).map_or(0.0, |p| (p.length() - self.distance).max(0.0))
    }
}
