//! The crossroads scene: a signalised four-way junction with a mid-block
//! zebra and a bus stop on the eastbound carriageway.
//!
//! ```text
//!                 │ N │
//!           NW    │   │    NE
//!        ─────────┼═══┼──────────────────
//!        ═══   W  │   │            Z  ═══   (E-W road, y = 0)
//!        ─────────┼───┼──────B───────────
//!           SW    │   │    SE
//!                 │   │
//! ```
//!
//! `W` and `N` are signalised crosswalks (group A serves east-west traffic,
//! group B north-south), `Z` is a zebra at x = 45 and `B` the bus stop.
//! There is no crosswalk south or east of the junction, so pedestrians walk
//! round through the others.

use std::io::Cursor;
use std::sync::Arc;

use anyhow::Result;

use st_core::{GateId, PathId, Segment, StopId, Vec2};
use st_lane::{LaneNetwork, LaneNetworkBuilder};
use st_nav::{NodeGraph, RoadStrips, load_nodes_reader};
use st_pedestrian::{Occluders, RectSurface};
use st_signal::{
    CrosswalkZone, GateSet, PhaseTimings, SignalGroup, SignalLeg, TrafficLightController,
};
use st_vehicle::StopMarker;

/// Half the extent of the scene in metres.
pub const EXTENT: f32 = 80.0;

// Node ids are row numbers; `gate` is the GateId the group is bound to.
const NODES_CSV: &str = "\
x,y,kind,radius_hint,capacity,group,gate\n\
-6,-6,corner,30,,,\n\
6,-6,corner,30,,,\n\
-6,6,corner,30,,,\n\
6,6,corner,30,,,\n\
-30,-6,midblock,30,,,\n\
-55,-6,midblock,30,,,\n\
-30,6,midblock,30,,,\n\
-55,6,midblock,30,,,\n\
25,-6,midblock,30,,,\n\
65,-6,midblock,30,,,\n\
25,6,midblock,30,,,\n\
65,6,midblock,30,,,\n\
-6,30,midblock,30,,,\n\
6,30,midblock,30,,,\n\
-6,-30,midblock,30,,,\n\
6,-30,midblock,30,,,\n\
-10,-6,crossing,30,,0,0\n\
-10,6,crossing,30,,0,0\n\
-6,10,crossing,30,,1,1\n\
6,10,crossing,30,,1,1\n\
45,-6,crossing,30,,2,2\n\
45,6,crossing,30,,2,2\n\
30,-7,busstop,30,3,,\n\
";

pub struct Lanes {
    pub network:    LaneNetwork,
    pub eastbound:  PathId,
    pub westbound:  PathId,
    pub northbound: PathId,
    pub southbound: PathId,
}

/// Pedestrian graph, with the two road centre lines as obstructions.
pub fn build_graph() -> Result<NodeGraph> {
    let mut builder = load_nodes_reader(Cursor::new(NODES_CSV))?;
    let mut roads = RoadStrips::default();
    roads.add_polyline(&[Vec2::new(-EXTENT, 0.0), Vec2::new(EXTENT, 0.0)]);
    roads.add_polyline(&[Vec2::new(0.0, -EXTENT), Vec2::new(0.0, EXTENT)]);
    builder.road_obstruction(roads);
    Ok(builder.build()?)
}

/// Crosswalks in the order the node CSV refers to them.
pub fn build_gates(start_time: f64) -> Result<GateSet> {
    let controller = Arc::new(TrafficLightController::new(PhaseTimings::default(), start_time, 0.0)?);
    let east_west = Arc::new(SignalLeg::new(Arc::clone(&controller), SignalGroup::A));
    let north_south = Arc::new(SignalLeg::new(controller, SignalGroup::B));

    let mut gates = GateSet::new();
    let west = gates.add(CrosswalkZone::signalised(Vec2::new(-10.0, 0.0), east_west));
    let north = gates.add(CrosswalkZone::signalised(Vec2::new(0.0, 10.0), north_south));
    let zebra = gates.add(CrosswalkZone::zebra(Vec2::new(45.0, 0.0)));
    debug_assert_eq!([west, north, zebra], [GateId(0), GateId(1), GateId(2)]);
    Ok(gates)
}

/// One lane per direction, two metres either side of each centre line.
pub fn build_lanes() -> Result<Lanes> {
    let e = EXTENT;
    let mut b = LaneNetworkBuilder::new();
    let eastbound = b.add_path(vec![Vec2::new(-e, -2.0), Vec2::new(e, -2.0)]);
    let westbound = b.add_path(vec![Vec2::new(e, 2.0), Vec2::new(-e, 2.0)]);
    let northbound = b.add_path(vec![Vec2::new(2.0, -e), Vec2::new(2.0, e)]);
    let southbound = b.add_path(vec![Vec2::new(-2.0, e), Vec2::new(-2.0, -e)]);
    Ok(Lanes { network: b.build()?, eastbound, westbound, northbound, southbound })
}

/// The kerbside bus stop beside the `busstop` node.
pub fn build_stops() -> Vec<StopMarker> {
    vec![StopMarker::new(StopId(0), Vec2::new(30.0, -2.0), Vec2::new(1.0, 0.0))]
}

/// Building frontages in each quadrant.  Enforcers cannot see through them.
pub fn build_walls() -> Occluders {
    let wall = |ax, ay, bx, by| Segment::new(Vec2::new(ax, ay), Vec2::new(bx, by));
    Occluders::new(vec![
        wall(-60.0, -12.0, -14.0, -12.0),
        wall(-14.0, -12.0, -14.0, -60.0),
        wall(-60.0, 14.0, -12.0, 14.0),
        wall(12.0, 14.0, 60.0, 14.0),
        wall(12.0, -12.0, 60.0, -12.0),
    ])
}

pub fn walkable() -> RectSurface {
    RectSurface::new(Vec2::new(-EXTENT, -EXTENT), Vec2::new(EXTENT, EXTENT))
}
