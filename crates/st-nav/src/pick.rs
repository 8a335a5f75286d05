//! The candidate pipeline: radius + forward cone, crossing filters, lockout,
//! and one relaxed retry.

use st_core::{NodeId, Vec2};

use crate::NodeGraph;

/// How the pipeline relaxes when the first pass finds nothing.
///
/// The exact numbers are tuning, not correctness: any retry that widens the
/// search keeps agents moving in sparse corners of the graph.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Radius multiplier for the retry pass.
    pub widen_factor:    f32,
    /// Forward-cone threshold for the retry pass (`-1` accepts any direction).
    pub relaxed_min_dot: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { widen_factor: 1.5, relaxed_min_dot: -1.0 }
    }
}

/// Everything the pipeline needs to know about the agent asking.
#[derive(Clone, Debug)]
pub struct CandidateQuery {
    pub pos:         Vec2,
    pub forward:     Vec2,
    pub radius:      f32,
    /// The node the agent just came from (no U-turns).
    pub last:        Option<NodeId>,
    /// Agents standing on a crossing node skip the near-side and road
    /// filters: they are about to use the crosswalk.
    pub on_crossing: bool,
    pub min_dot:     f32,
    pub now:         f64,
    pub lock_until:  f64,
}

impl NodeGraph {
    /// Run the full candidate pipeline for `query`.
    ///
    /// An empty result means the agent should idle and retry later.
    pub fn pick_candidates(&self, query: &CandidateQuery, retry: &RetryPolicy) -> Vec<NodeId> {
        let first = self.filtered_candidates(query, query.radius, query.min_dot);
        if !first.is_empty() {
            return first;
        }

        let relaxed = self.filtered_candidates(
            query,
            query.radius * retry.widen_factor,
            retry.relaxed_min_dot,
        );
        if relaxed.is_empty() {
            log::trace!("no candidates around {} even after relaxing", query.pos);
        }
        relaxed
    }

    fn filtered_candidates(&self, query: &CandidateQuery, radius: f32, min_dot: f32) -> Vec<NodeId> {
        let mut list = self.candidates(query.pos, query.forward, radius, query.last, min_dot);
        if !query.on_crossing {
            list = self.filter_crossings_to_nearest_side(list, query.pos);
            list = self.filter_that_would_cross_road(list, query.pos);
        }
        self.apply_global_crossing_lock(list, query.now, query.lock_until)
    }
}
