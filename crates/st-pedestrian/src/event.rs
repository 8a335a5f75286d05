//! What a pedestrian tick reports back.

use st_core::{GateId, NodeId, PedId};

use crate::Violation;

/// Side effects a pedestrian asks the simulation to apply after the
/// (possibly parallel) pedestrian phase.
#[derive(Clone, Debug, PartialEq)]
pub enum PedEvent {
    /// Publish on the violation bus.
    Violation(Violation),

    /// Stepped onto a crosswalk at `node`.
    CrossingStarted { node: NodeId, gate: Option<GateId> },

    /// Reached the far curb.  Under a global lock scope the simulation
    /// records the crossing here.
    CrossingFinished { gate: Option<GateId>, far: Option<NodeId> },

    /// The far curb could not be placed on the walkable surface.
    CrossingAbandoned { node: NodeId },

    ChaseStarted { offender: PedId },
    Arrested { offender: PedId },
    ChaseAbandoned { offender: PedId },

    /// No claimable, reachable node was found; the pedestrian idles.
    PickFailed { at: Option<NodeId> },
}
