//! Navigation graph representation and builder.
//!
//! # Data layout
//!
//! Nodes are stored in a dense `Vec<PedNode>` indexed by `NodeId`, in the
//! order they were authored.  That order is the tie-break for every sorted
//! query, so results are reproducible across runs.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) answers radius and nearest-node queries without a
//! linear scan over all nodes.
//!
//! # Claims
//!
//! Each node has one `AtomicU32` claim counter.  `try_claim` and `release`
//! take `&self` and use compare-and-swap, so the capacity invariant holds
//! even when several agents claim the same bus stop from different threads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use st_core::{GateId, GroupId, NodeId, Vec2};

use crate::node::{CrossingGroup, NodeKind, PedNode};
use crate::obstruction::RoadObstruction;
use crate::{NavError, NavResult};

/// Candidates closer than this (squared) are treated as "already here".
const MIN_CANDIDATE_DIST_SQ: f32 = 0.01;

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[x, y]` point with the
/// associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── Claim table ───────────────────────────────────────────────────────────────

/// Per-node count of agents currently targeting the node.
struct ClaimTable {
    counts: Vec<AtomicU32>,
}

impl ClaimTable {
    fn new(node_count: usize) -> Self {
        Self { counts: (0..node_count).map(|_| AtomicU32::new(0)).collect() }
    }

    fn count(&self, node: NodeId) -> u32 {
        self.counts
            .get(node.index())
            .map_or(0, |c| c.load(Ordering::Acquire))
    }

    fn try_claim(&self, node: NodeId, cap: Option<u32>) -> Option<u32> {
        let slot = self.counts.get(node.index())?;
        let mut current = slot.load(Ordering::Acquire);
        loop {
            if cap.is_some_and(|cap| current >= cap) {
                return None;
            }
            let next = current.checked_add(1)?;
            match slot.compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => return Some(current),
                Err(actual) => current = actual,
            }
        }
    }

    fn release(&self, node: NodeId) {
        if let Some(slot) = self.counts.get(node.index()) {
            // Floored at zero: an unmatched release is a no-op.
            let _ = slot.fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));
        }
    }
}

// ── NodeGraph ─────────────────────────────────────────────────────────────────

/// The pedestrian navigation graph: immutable nodes, crossing groups, an
/// R-tree, and the live claim table.
///
/// Do not construct directly; use [`NodeGraphBuilder`].
pub struct NodeGraph {
    nodes:       Vec<PedNode>,
    groups:      Vec<CrossingGroup>,
    claims:      ClaimTable,
    spatial_idx: RTree<NodeEntry>,
    road:        Option<Box<dyn RoadObstruction>>,
}

impl NodeGraph {
    /// A graph with no nodes.  Every query returns nothing.
    pub fn empty() -> Self {
        Self {
            nodes:       Vec::new(),
            groups:      Vec::new(),
            claims:      ClaimTable::new(0),
            spatial_idx: RTree::new(),
            road:        None,
        }
    }

    // ── Node data ─────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&PedNode> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn pos(&self, id: NodeId) -> Option<Vec2> {
        self.node(id).map(|n| n.pos)
    }

    /// All nodes in authored order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &PedNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    #[inline]
    pub fn is_crossing(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(PedNode::is_crossing)
    }

    // ── Crossing groups ───────────────────────────────────────────────────

    pub fn group(&self, id: GroupId) -> Option<&CrossingGroup> {
        self.groups.get(id.index())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// The gate governing `group`, if one was bound.
    pub fn group_gate(&self, group: GroupId) -> Option<GateId> {
        self.group(group).and_then(|g| g.gate)
    }

    /// Crossing group of `node` (crossing nodes only).
    pub fn node_group(&self, node: NodeId) -> Option<GroupId> {
        self.node(node).and_then(|n| n.group)
    }

    /// The opposite curb of `node`'s crosswalk.
    pub fn partner(&self, node: NodeId) -> Option<NodeId> {
        let group = self.node_group(node)?;
        self.group(group)?.partner_of(node)
    }

    /// `true` if `a` and `b` are opposite sides of the same crosswalk.
    pub fn are_opposite_crossing_sides(&self, a: NodeId, b: NodeId) -> bool {
        if a == b || !self.is_crossing(a) || !self.is_crossing(b) {
            return false;
        }
        matches!((self.node_group(a), self.node_group(b)), (Some(ga), Some(gb)) if ga == gb)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Closest node strictly within `max_distance` of `pos`.
    pub fn nearest(&self, pos: Vec2, max_distance: f32) -> Option<NodeId> {
        let query = [pos.x, pos.y];
        self.spatial_idx
            .nearest_neighbor(&query)
            .filter(|e| e.distance_2(&query) < max_distance * max_distance)
            .map(|e| e.id)
    }

    /// All nodes other than `excluding` within `radius` of `pos` whose
    /// direction from `pos` satisfies `dot(forward, dir) >= min_dot`.
    ///
    /// The result is sorted ascending by current claim count so the least
    /// occupied node comes first; ties keep graph order.
    pub fn candidates(
        &self,
        pos:       Vec2,
        forward:   Vec2,
        radius:    f32,
        excluding: Option<NodeId>,
        min_dot:   f32,
    ) -> Vec<NodeId> {
        let fwd = forward.normalized_or(Vec2::FORWARD);
        let mut list: Vec<NodeId> = self
            .spatial_idx
            .locate_within_distance([pos.x, pos.y], radius * radius)
            .map(|e| e.id)
            .filter(|&id| Some(id) != excluding)
            .filter(|&id| {
                let to = self.nodes[id.index()].pos - pos;
                let d2 = to.length_sq();
                d2 >= MIN_CANDIDATE_DIST_SQ && fwd.dot(to * (1.0 / d2.sqrt())) >= min_dot
            })
            .collect();

        // R-tree order is arbitrary: restore graph order, then a stable sort
        // by load keeps it as the tie-break.
        list.sort_unstable();
        list.sort_by_key(|&id| self.claims.count(id));
        list
    }

    // ── Claims ────────────────────────────────────────────────────────────

    /// Number of agents currently targeting `node`.
    pub fn claim_count(&self, node: NodeId) -> u32 {
        self.claims.count(node)
    }

    /// Claim a slot on `node`.
    ///
    /// Returns the slot index (the occupancy before this claim) on success.
    /// Bus stops refuse once `capacity` is reached; other kinds always
    /// succeed.  Unknown nodes are refused.
    pub fn try_claim(&self, node: NodeId) -> Option<u32> {
        let cap = self.node(node)?.capacity_limit();
        self.claims.try_claim(node, cap)
    }

    /// Give back one claim on `node`.  Never drops below zero.
    pub fn release(&self, node: NodeId) {
        self.claims.release(node);
    }

    // ── Candidate filters ─────────────────────────────────────────────────

    /// For every crossing group represented in `list`, keep only the member
    /// nearest to `from`.  Non-crossing nodes pass through unchanged.
    ///
    /// Stops an agent aiming at the far curb of a crosswalk before it has
    /// committed to crossing.
    pub fn filter_crossings_to_nearest_side(&self, list: Vec<NodeId>, from: Vec2) -> Vec<NodeId> {
        let mut nearest: HashMap<GroupId, (NodeId, f32)> = HashMap::new();
        for &id in &list {
            let node = &self.nodes[id.index()];
            let Some(group) = node.group.filter(|_| node.is_crossing()) else {
                continue;
            };
            let d2 = node.pos.distance_sq(from);
            match nearest.get(&group) {
                Some(&(_, best)) if best <= d2 => {}
                _ => {
                    nearest.insert(group, (id, d2));
                }
            }
        }

        list.into_iter()
            .filter(|&id| {
                let node = &self.nodes[id.index()];
                if !node.is_crossing() {
                    return true;
                }
                node.group
                    .and_then(|g| nearest.get(&g))
                    .is_some_and(|&(keep, _)| keep == id)
            })
            .collect()
    }

    /// Drop non-crossing candidates whose straight line from `from` crosses a
    /// road.  Crossing nodes are exempt.  Without a configured obstruction
    /// the list is returned unchanged.
    pub fn filter_that_would_cross_road(&self, list: Vec<NodeId>, from: Vec2) -> Vec<NodeId> {
        let Some(road) = self.road.as_deref() else {
            return list;
        };
        list.into_iter()
            .filter(|&id| {
                let node = &self.nodes[id.index()];
                node.is_crossing() || !road.blocks(from, node.pos)
            })
            .collect()
    }

    /// Remove every crossing node while `now < lock_until`.
    pub fn apply_global_crossing_lock(&self, list: Vec<NodeId>, now: f64, lock_until: f64) -> Vec<NodeId> {
        if now >= lock_until {
            return list;
        }
        list.into_iter()
            .filter(|&id| !self.is_crossing(id))
            .collect()
    }
}

// ── NodeGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`NodeGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use st_core::Vec2;
/// use st_nav::{NodeGraphBuilder, PedNode};
///
/// let mut b = NodeGraphBuilder::new();
/// b.add_node(PedNode::corner(Vec2::new(0.0, 0.0)));
/// let (near, far) = b.add_crossing_pair(Vec2::new(4.0, 0.0), Vec2::new(4.0, 10.0), None);
/// let graph = b.build().unwrap();
/// assert_eq!(graph.partner(near), Some(far));
/// ```
#[derive(Default)]
pub struct NodeGraphBuilder {
    nodes:  Vec<PedNode>,
    groups: Vec<CrossingGroup>,
    road:   Option<Box<dyn RoadObstruction>>,
}

impl NodeGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, node: PedNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Register a new crossing group, optionally bound to a gate.
    pub fn add_crossing_group(&mut self, gate: Option<GateId>) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        self.groups.push(CrossingGroup { sides: Vec::new(), gate });
        id
    }

    /// Bind (or rebind) a gate to an existing group.
    pub fn bind_gate(&mut self, group: GroupId, gate: GateId) {
        if let Some(g) = self.groups.get_mut(group.index()) {
            g.gate = Some(gate);
        }
    }

    /// Convenience: a group with one crossing node on each curb.
    pub fn add_crossing_pair(&mut self, a: Vec2, b: Vec2, gate: Option<GateId>) -> (NodeId, NodeId) {
        let group = self.add_crossing_group(gate);
        let na = self.add_node(PedNode::crossing(a, group));
        let nb = self.add_node(PedNode::crossing(b, group));
        (na, nb)
    }

    /// Install the road obstruction used by
    /// [`NodeGraph::filter_that_would_cross_road`].
    pub fn road_obstruction(&mut self, road: impl RoadObstruction + 'static) -> &mut Self {
        self.road = Some(Box::new(road));
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Validate crossing groups and produce a [`NodeGraph`].
    ///
    /// # Errors
    ///
    /// - a crossing node without a group, or a grouped non-crossing node;
    /// - a node referencing a group that was never registered;
    /// - a group with zero or more than two members.
    pub fn build(self) -> NavResult<NodeGraph> {
        let mut groups = self.groups;
        for (i, node) in self.nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            match (node.kind, node.group) {
                (NodeKind::Crossing, None) => return Err(NavError::UngroupedCrossing(id)),
                (NodeKind::Crossing, Some(group)) => match groups.get_mut(group.index()) {
                    Some(g) => g.sides.push(id),
                    None => return Err(NavError::UnknownGroup { node: id, group }),
                },
                (_, Some(group)) => return Err(NavError::GroupedNonCrossing { node: id, group }),
                (_, None) => {}
            }
        }
        for (i, g) in groups.iter().enumerate() {
            if g.sides.is_empty() || g.sides.len() > 2 {
                return Err(NavError::GroupSize { group: GroupId(i as u32), members: g.sides.len() });
            }
        }

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| NodeEntry { point: [n.pos.x, n.pos.y], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        log::debug!(
            "built navigation graph: {} nodes, {} crossing groups, road filter {}",
            self.nodes.len(),
            groups.len(),
            if self.road.is_some() { "on" } else { "off" },
        );

        Ok(NodeGraph {
            claims: ClaimTable::new(self.nodes.len()),
            nodes: self.nodes,
            groups,
            spatial_idx,
            road: self.road,
        })
    }
}
