//! `st-nav`: the pedestrian navigation graph.
//!
//! Pedestrians wander between typed waypoints (`PedNode`s).  The graph owns
//! the only contended pedestrian resource: per-node claim counts.  Everything
//! else here is a pure query over immutable node data.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`node`]        | `PedNode`, `NodeKind`, `CrossingGroup`                    |
//! | [`graph`]       | `NodeGraph` (R-tree + claim table), `NodeGraphBuilder`    |
//! | [`pick`]        | `CandidateQuery`, `RetryPolicy`: the candidate pipeline   |
//! | [`lock`]        | `CrossingLock`, `CrossingLockConfig`, `LockScope`         |
//! | [`obstruction`] | `RoadObstruction` capability, `RoadStrips`                |
//! | [`loader`]      | `load_nodes_csv` / `load_nodes_reader`                    |
//! | [`error`]       | `NavError`, `NavResult<T>`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod graph;
pub mod loader;
pub mod lock;
pub mod node;
pub mod obstruction;
pub mod pick;


pub use error::{NavError, NavResult};
pub use graph::{NodeGraph, NodeGraphBuilder};
pub use loader::{load_nodes_csv, load_nodes_reader};
pub use lock::{CrossingLock, CrossingLockConfig, LockScope};
pub use node::{CrossingGroup, NodeKind, PedNode};
pub use obstruction::{RoadObstruction, RoadStrips};
pub use pick::{CandidateQuery, RetryPolicy};
