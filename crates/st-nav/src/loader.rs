//! CSV node loader.
//!
//! # CSV format
//!
//! One row per node, in graph order (row `n` becomes `NodeId(n)`).
//!
//! ```csv
//! x,y,kind,radius_hint,capacity,group,gate
//! 0.0,0.0,corner,,,,
//! 4.0,0.0,crossing,,,0,2
//! 4.0,10.0,crossing,,,0,2
//! 12.0,0.0,busstop,,3,,
//! ```
//!
//! | Column        | Meaning                                                  |
//! |---------------|----------------------------------------------------------|
//! | `kind`        | `midblock`, `corner`, `crossing`, or `busstop`           |
//! | `radius_hint` | optional; defaults to 15                                 |
//! | `capacity`    | optional; defaults to 2 (bus stops only)                 |
//! | `group`       | crossing group label, any `u32`; required for crossings  |
//! | `gate`        | optional `GateId` bound to the row's group               |
//!
//! Group labels are file-local: they are remapped to dense `GroupId`s in
//! order of first appearance.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use st_core::{GateId, GroupId, Vec2};

use crate::node::{NodeKind, PedNode};
use crate::{NavError, NavResult, NodeGraphBuilder};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    x:           f32,
    y:           f32,
    kind:        String,
    radius_hint: Option<f32>,
    capacity:    Option<u32>,
    group:       Option<u32>,
    gate:        Option<u32>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load nodes from a CSV file into a builder.
///
/// Returns the builder rather than a graph so the caller can still install a
/// road obstruction before calling `build()`.
pub fn load_nodes_csv(path: &Path) -> NavResult<NodeGraphBuilder> {
    let file = std::fs::File::open(path)?;
    load_nodes_reader(file)
}

/// Like [`load_nodes_csv`] but accepts any `Read` source.
pub fn load_nodes_reader<R: Read>(reader: R) -> NavResult<NodeGraphBuilder> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut builder = NodeGraphBuilder::new();
    let mut groups: HashMap<u32, GroupId> = HashMap::new();

    for (row, result) in csv_reader.deserialize::<NodeRecord>().enumerate() {
        let rec = result.map_err(|e| NavError::Parse(e.to_string()))?;
        let kind = parse_kind(&rec.kind)?;

        let mut node = PedNode::new(Vec2::new(rec.x, rec.y), kind);
        if let Some(r) = rec.radius_hint {
            node.radius_hint = r;
        }
        if let Some(c) = rec.capacity {
            node.capacity = c;
        }

        match (rec.group, rec.gate) {
            (Some(label), gate) => {
                let group = *groups
                    .entry(label)
                    .or_insert_with(|| builder.add_crossing_group(None));
                if let Some(gate) = gate {
                    builder.bind_gate(group, GateId(gate));
                }
                node.group = Some(group);
            }
            (None, Some(_)) => {
                return Err(NavError::Parse(format!(
                    "row {row}: gate given without a crossing group"
                )));
            }
            (None, None) => {}
        }

        builder.add_node(node);
    }

    Ok(builder)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_kind(s: &str) -> NavResult<NodeKind> {
    match s.trim().to_ascii_lowercase().as_str() {
        "midblock" => Ok(NodeKind::MidBlock),
        "corner" => Ok(NodeKind::Corner),
        "crossing" => Ok(NodeKind::Crossing),
        "busstop" => Ok(NodeKind::BusStop),
        other => Err(NavError::Parse(format!(
            "invalid node kind {other:?}: expected midblock, corner, crossing, or busstop"
        ))),
    }
}
