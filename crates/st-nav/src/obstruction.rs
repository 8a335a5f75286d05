//! Road-obstruction capability used to stop pedestrians cutting across
//! carriageways outside a crosswalk.

use st_core::{Segment, Vec2};

/// Answers "does the straight walk from `from` to `to` cross a road?".
///
/// Injected into [`NodeGraph`][crate::NodeGraph] so the graph never needs a
/// physics or geometry engine of its own.  Closures
/// `Fn(Vec2, Vec2) -> bool` implement it directly.
pub trait RoadObstruction: Send + Sync {
    fn blocks(&self, from: Vec2, to: Vec2) -> bool;
}

impl<F> RoadObstruction for F
where
    F: Fn(Vec2, Vec2) -> bool + Send + Sync,
{
    fn blocks(&self, from: Vec2, to: Vec2) -> bool {
        self(from, to)
    }
}

/// Roads modelled as a set of line strips (typically the carriageway centre
/// lines).  A walk is blocked if it crosses any strip.
#[derive(Clone, Debug, Default)]
pub struct RoadStrips {
    strips: Vec<Segment>,
}

impl RoadStrips {
    pub fn new(strips: Vec<Segment>) -> Self {
        Self { strips }
    }

    /// Add every consecutive pair of `points` as one strip.
    pub fn add_polyline(&mut self, points: &[Vec2]) {
        self.strips
            .extend(points.windows(2).map(|w| Segment::new(w[0], w[1])));
    }

    pub fn len(&self) -> usize {
        self.strips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }
}

impl RoadObstruction for RoadStrips {
    fn blocks(&self, from: Vec2, to: Vec2) -> bool {
        let walk = Segment::new(from, to);
        self.strips.iter().any(|s| s.intersects(&walk))
    }
}
