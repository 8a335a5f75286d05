//! Navigation-graph error type.
//!
//! Only graph construction and loading can fail.  Runtime queries
//! (candidates, claims, filters) are infallible by design of the tick loop:
//! an empty candidate list is an outcome, not an error.

use thiserror::Error;

use st_core::{GroupId, NodeId};

/// Errors produced by `st-nav`.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("crossing node {0} has no crossing group")]
    UngroupedCrossing(NodeId),

    #[error("node {node} is not a crossing but was assigned to group {group}")]
    GroupedNonCrossing { node: NodeId, group: GroupId },

    #[error("node {node} references unknown crossing group {group}")]
    UnknownGroup { node: NodeId, group: GroupId },

    #[error("crossing group {group} has {members} members (expected 1 or 2)")]
    GroupSize { group: GroupId, members: usize },

    #[error("node parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NavResult<T> = Result<T, NavError>;
