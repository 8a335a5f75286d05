//! Lane networks and their builder.

use st_core::{PathId, Vec2};

use crate::{LaneError, LanePath, LaneResult};

// ── LaneNetwork ───────────────────────────────────────────────────────────────

/// Every lane path in a scene, indexed by `PathId`.
///
/// Slots for paths that failed to bake stay empty, so their ids never
/// resolve and vehicles assigned to them are inert.
///
/// Do not construct directly; use [`LaneNetworkBuilder`].
#[derive(Clone, Debug, Default)]
pub struct LaneNetwork {
    paths: Vec<Option<LanePath>>,
}

impl LaneNetwork {
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, id: PathId) -> Option<&LanePath> {
        self.paths.get(id.index())?.as_ref()
    }

    pub fn require(&self, id: PathId) -> LaneResult<&LanePath> {
        self.get(id).ok_or(LaneError::UnknownPath(id))
    }

    /// Number of usable paths.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanePath> + '_ {
        self.paths.iter().flatten()
    }

    /// The path whose first point is closest to `pos`.
    ///
    /// Hand-placed vehicles without an assigned lane start on this one.
    pub fn nearest_start(&self, pos: Vec2) -> Option<PathId> {
        self.iter()
            .min_by(|a, b| a.start().distance_sq(pos).total_cmp(&b.start().distance_sq(pos)))
            .map(LanePath::id)
    }
}

// ── LaneNetworkBuilder ────────────────────────────────────────────────────────

struct RawPath {
    points:      Vec<Vec2>,
    next:        Vec<PathId>,
    loop_at_end: bool,
}

/// Collects polylines and continuations, then bakes and validates them.
///
/// # Example
///
/// ```
/// use st_core::Vec2;
/// use st_lane::LaneNetworkBuilder;
///
/// let mut b = LaneNetworkBuilder::new();
/// let east = b.add_path(vec![Vec2::new(0.0, 0.0), Vec2::new(50.0, 0.0)]);
/// let north = b.add_path(vec![Vec2::new(50.0, 0.0), Vec2::new(50.0, 40.0)]);
/// b.connect(east, north);
/// let lanes = b.build().unwrap();
/// assert_eq!(lanes.get(east).unwrap().next(), &[north]);
/// ```
#[derive(Default)]
pub struct LaneNetworkBuilder {
    raw: Vec<RawPath>,
}

impl LaneNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a polyline and return its `PathId` (sequential from 0).
    pub fn add_path(&mut self, points: Vec<Vec2>) -> PathId {
        let id = PathId(self.raw.len() as u32);
        self.raw.push(RawPath { points, next: Vec::new(), loop_at_end: false });
        id
    }

    /// Let vehicles continue from the end of `from` onto `to`.
    pub fn connect(&mut self, from: PathId, to: PathId) -> &mut Self {
        if let Some(raw) = self.raw.get_mut(from.index()) {
            raw.next.push(to);
        }
        self
    }

    /// Wrap to the start of `path` at its end when it has no continuation.
    pub fn set_loop(&mut self, path: PathId, loop_at_end: bool) -> &mut Self {
        if let Some(raw) = self.raw.get_mut(path.index()) {
            raw.loop_at_end = loop_at_end;
        }
        self
    }

    /// Bake every path and check that all continuations exist.
    ///
    /// A path that cannot be baked (fewer than two points, zero length) is
    /// logged and left unresolvable; continuations into it are dropped.
    /// Only a continuation to an id that was never added is an error.
    pub fn build(self) -> LaneResult<LaneNetwork> {
        let count = self.raw.len();
        for (i, raw) in self.raw.iter().enumerate() {
            if let Some(&next) = raw.next.iter().find(|n| n.index() >= count) {
                return Err(LaneError::UnknownNext { path: PathId(i as u32), next });
            }
        }

        let mut paths: Vec<Option<LanePath>> = Vec::with_capacity(count);
        for (i, raw) in self.raw.into_iter().enumerate() {
            let id = PathId(i as u32);
            match LanePath::bake(id, raw.points, raw.next) {
                Ok(path) => paths.push(Some(path.with_loop(raw.loop_at_end))),
                Err(e) => {
                    log::warn!("{e}; vehicles assigned to {id} will be inert");
                    paths.push(None);
                }
            }
        }

        let valid: Vec<bool> = paths.iter().map(Option::is_some).collect();
        for path in paths.iter_mut().flatten() {
            path.retain_next(|n| valid[n.index()]);
        }

        log::debug!(
            "built lane network: {} of {count} paths usable",
            valid.iter().filter(|&&ok| ok).count()
        );
        Ok(LaneNetwork { paths })
    }
}
