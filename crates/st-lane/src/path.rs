//! Baked lane polylines.

use st_core::{AgentRng, PathId, Vec2};

use crate::{LaneError, LaneResult};

/// Segments shorter than this are skipped by [`LanePath::project`].
const MIN_SEGMENT_LEN: f32 = 0.01;

/// An ordered lane polyline with precomputed arc lengths.
///
/// `cumulative[i]` is the distance from the first point to `points[i]`, so
/// `cumulative[0] == 0` and the last entry is the path length.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LanePath {
    id:              PathId,
    points:          Vec<Vec2>,
    cumulative:      Vec<f32>,
    /// Unit direction of each segment; zero-length segments inherit the
    /// previous direction.
    directions:      Vec<Vec2>,
    next:            Vec<PathId>,
    /// Wrap to the start when the end is reached and there is no `next`.
    pub loop_at_end: bool,
}

impl LanePath {
    /// Bake `points` into a path.
    ///
    /// # Errors
    ///
    /// `TooFewPoints` for fewer than two points, `ZeroLength` when every
    /// point coincides.
    pub fn bake(id: PathId, points: Vec<Vec2>, next: Vec<PathId>) -> LaneResult<Self> {
        if points.len() < 2 {
            return Err(LaneError::TooFewPoints { path: id, points: points.len() });
        }

        let mut cumulative = Vec::with_capacity(points.len());
        cumulative.push(0.0);
        for w in points.windows(2) {
            let last = cumulative.last().copied().unwrap_or(0.0);
            cumulative.push(last + w[0].distance(w[1]));
        }
        if cumulative.last().copied().unwrap_or(0.0) <= 0.0 {
            return Err(LaneError::ZeroLength(id));
        }

        // Seed with the first non-degenerate direction so leading duplicate
        // points still face along the lane.
        let first_dir = points
            .windows(2)
            .map(|w| w[1] - w[0])
            .find(|d| d.length_sq() > 0.0)
            .map_or(Vec2::FORWARD, |d| d.normalized_or(Vec2::FORWARD));
        let mut directions = Vec::with_capacity(points.len() - 1);
        let mut prev = first_dir;
        for w in points.windows(2) {
            prev = (w[1] - w[0]).normalized_or(prev);
            directions.push(prev);
        }

        Ok(Self { id, points, cumulative, directions, next, loop_at_end: false })
    }

    pub fn with_loop(mut self, loop_at_end: bool) -> Self {
        self.loop_at_end = loop_at_end;
        self
    }

    /// Drop continuations that fail `keep`.
    pub(crate) fn retain_next(&mut self, keep: impl Fn(PathId) -> bool) {
        self.next.retain(|&n| keep(n));
    }

    #[inline]
    pub fn id(&self) -> PathId {
        self.id
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Paths a vehicle may continue onto from this path's end.
    pub fn next(&self) -> &[PathId] {
        &self.next
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.cumulative[self.cumulative.len() - 1]
    }

    #[inline]
    pub fn start(&self) -> Vec2 {
        self.points[0]
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.points[self.points.len() - 1]
    }

    /// `(segment index, offset into that segment)` for arc length `d`.
    ///
    /// `d` is clamped to `[0, length]`; the end of the path reports the last
    /// segment with its full length as offset.
    pub fn locate(&self, d: f32) -> (usize, f32) {
        let d = d.clamp(0.0, self.length());
        let upper = self.cumulative.partition_point(|&c| c <= d);
        let seg = upper.saturating_sub(1).min(self.segment_count() - 1);
        (seg, d - self.cumulative[seg])
    }

    /// World position at arc length `d` (clamped).
    pub fn point_at(&self, d: f32) -> Vec2 {
        let (seg, offset) = self.locate(d);
        let a = self.points[seg];
        let len = self.cumulative[seg + 1] - self.cumulative[seg];
        if len <= 0.0 {
            return a;
        }
        a.lerp(self.points[seg + 1], offset / len)
    }

    /// Unit travel direction at arc length `d` (clamped).
    pub fn direction_at(&self, d: f32) -> Vec2 {
        self.directions[self.locate(d).0]
    }

    /// Uniform choice among `next`; `None` at a dead end.
    pub fn pick_next(&self, rng: &mut AgentRng) -> Option<PathId> {
        rng.choose(&self.next).copied()
    }

    /// Arc length of the closest point on any segment whose direction agrees
    /// with `forward` (`dot >= min_forward_dot`).
    ///
    /// Used to drop a hand-placed vehicle onto a lane.  Returns `None` when
    /// no segment passes the direction test.
    pub fn project(&self, pos: Vec2, forward: Vec2, min_forward_dot: f32) -> Option<f32> {
        let fwd = forward.normalized_or(Vec2::FORWARD);
        let mut best: Option<(f32, f32)> = None;

        for (i, w) in self.points.windows(2).enumerate() {
            let len = self.cumulative[i + 1] - self.cumulative[i];
            if len < MIN_SEGMENT_LEN || self.directions[i].dot(fwd) < min_forward_dot {
                continue;
            }
            let dir = self.directions[i];
            let t = (pos - w[0]).dot(dir).clamp(0.0, len);
            let dist_sq = (w[0] + dir * t).distance_sq(pos);
            if best.is_none_or(|(d, _)| dist_sq < d) {
                best = Some((dist_sq, self.cumulative[i] + t));
            }
        }
        best.map(|(_, along)| along)
    }
}
