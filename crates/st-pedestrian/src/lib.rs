//! `st-pedestrian`: pedestrian agents.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                       |
//! |----------------|----------------------------------------------------------------|
//! | [`agent`]      | `Pedestrian`: the Wander / Crossing / Chase state machine      |
//! | [`config`]     | `PedConfig`, `PedRole`, `PedState`                             |
//! | [`context`]    | `PedContext<'a>`, `PositionLookup`                             |
//! | [`event`]      | `PedEvent`: what a tick reports back to the simulation         |
//! | [`violation`]  | `Violation`, `ViolationBus`, `ViolationListener`, `ViolationInbox` |
//! | [`perception`] | `LineOfSightProvider`, `can_see`                               |
//! | [`surface`]    | `NavSurface`: walkability queries                              |
//!
//! # Tick model
//!
//! A pedestrian tick only reads shared state through [`PedContext`].  The
//! two pieces of contended state it touches, node claims and crosswalk
//! occupancy, are atomics on `NodeGraph` and `CrosswalkZone`, so many
//! pedestrians can tick in parallel.  Everything else that must happen in
//! order, such as publishing violations or recording a shared crossing
//! lock, is returned as [`PedEvent`]s for the simulation to apply
//! sequentially.

pub mod agent;
pub mod config;
pub mod context;
pub mod event;
pub mod perception;
pub mod surface;
pub mod violation;


pub use agent::Pedestrian;
pub use config::{PedConfig, PedRole, PedState};
pub use context::{PedContext, PositionLookup};
pub use event::PedEvent;
pub use perception::{LineOfSightProvider, Occluders, OpenSky, can_see};
pub use surface::{NavSurface, OpenSurface, RectSurface};
pub use violation::{SubscriptionId, Violation, ViolationBus, ViolationInbox, ViolationListener, ViolationReason};
