//! Navigation node types.

use st_core::{GateId, GroupId, NodeId, Vec2};

/// Default search radius for agents departing a node.
pub const DEFAULT_RADIUS_HINT: f32 = 15.0;

/// Default number of agents allowed to target a bus stop at once.
pub const DEFAULT_BUS_STOP_CAPACITY: u32 = 2;

/// What a node represents on the street.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    MidBlock,
    Corner,
    /// One curb of a crosswalk.  Always belongs to a [`CrossingGroup`].
    Crossing,
    /// The only kind with an enforced claim capacity.
    BusStop,
}

/// A waypoint in the pedestrian graph.
///
/// Authored once at scene setup and immutable afterwards; runtime occupancy
/// lives in the graph's claim table, not here.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PedNode {
    pub pos:         Vec2,
    pub kind:        NodeKind,
    /// How far agents departing this node search for their next node.
    pub radius_hint: f32,
    /// Claim capacity.  Only meaningful for [`NodeKind::BusStop`].
    pub capacity:    u32,
    /// Crossing group for [`NodeKind::Crossing`] nodes; `None` otherwise.
    pub group:       Option<GroupId>,
}

impl PedNode {
    /// A node of `kind` with default radius and capacity and no group.
    pub fn new(pos: Vec2, kind: NodeKind) -> Self {
        Self {
            pos,
            kind,
            radius_hint: DEFAULT_RADIUS_HINT,
            capacity:    DEFAULT_BUS_STOP_CAPACITY,
            group:       None,
        }
    }

    pub fn mid_block(pos: Vec2) -> Self {
        Self::new(pos, NodeKind::MidBlock)
    }

    pub fn corner(pos: Vec2) -> Self {
        Self::new(pos, NodeKind::Corner)
    }

    pub fn bus_stop(pos: Vec2, capacity: u32) -> Self {
        Self { capacity, ..Self::new(pos, NodeKind::BusStop) }
    }

    pub fn crossing(pos: Vec2, group: GroupId) -> Self {
        Self { group: Some(group), ..Self::new(pos, NodeKind::Crossing) }
    }

    pub fn with_radius_hint(mut self, radius: f32) -> Self {
        self.radius_hint = radius;
        self
    }

    #[inline]
    pub fn is_crossing(&self) -> bool {
        self.kind == NodeKind::Crossing
    }

    /// The enforced claim cap, or `None` for unconstrained kinds.
    #[inline]
    pub fn capacity_limit(&self) -> Option<u32> {
        match self.kind {
            NodeKind::BusStop => Some(self.capacity),
            _ => None,
        }
    }
}

/// The curb nodes of one physical crosswalk plus the gate that governs it.
///
/// Normally two sides, one per curb.  A single-sided group is allowed: the
/// far curb is then computed from the gate position instead of a node.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossingGroup {
    pub sides: Vec<NodeId>,
    pub gate:  Option<GateId>,
}

impl CrossingGroup {
    /// The other side of the crosswalk from `node`, if the group has one.
    pub fn partner_of(&self, node: NodeId) -> Option<NodeId> {
        if !self.sides.contains(&node) {
            return None;
        }
        self.sides.iter().copied().find(|&n| n != node)
    }
}
