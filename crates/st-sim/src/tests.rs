//! Integration tests for st-sim.

use std::sync::{Arc, Mutex};

use st_core::{CoreError, GateId, NodeId, PathId, PedId, SimConfig, StopId, Tick, Vec2, VehicleId};
use st_lane::LaneNetworkBuilder;
use st_nav::{LockScope, NodeGraphBuilder, PedNode};
use st_pedestrian::{PedConfig, PedEvent, PedRole, PedState, Pedestrian, Violation};
use st_signal::{CrosswalkZone, GateSet, SignalError};
use st_vehicle::{StopMarker, VehicleAgent, VehicleConfig, VehicleFleet};

use crate::{NoopObserver, Sim, SimBuilder, SimError, SimObserver, SimResult};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn v(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

fn test_config(total_ticks: u64) -> SimConfig {
    SimConfig {
        start_time_secs:    0.0,
        tick_duration_secs: 0.1,
        total_ticks,
        seed:               42,
        num_threads:        Some(1),
    }
}

struct Scene {
    gate: GateId,
    near: NodeId,
    far:  NodeId,
    path: Option<PathId>,
}

/// A zebra crossing from (0,0) to (0,8) with its gate at (0,4), a sidewalk
/// corner on each side, and an optional lane.
fn zebra_scene(config: SimConfig, ped_config: PedConfig, lane: &[Vec2]) -> SimResult<(Sim, Scene)> {
    let mut gates = GateSet::new();
    let gate = gates.add(CrosswalkZone::zebra(v(0.0, 4.0)));

    let mut b = NodeGraphBuilder::new();
    let (near, far) = b.add_crossing_pair(v(0.0, 0.0), v(0.0, 8.0), Some(gate));
    b.add_node(PedNode::corner(v(-10.0, -1.0)));
    b.add_node(PedNode::corner(v(-10.0, 9.0)));
    let graph = b.build()?;

    let mut lanes = LaneNetworkBuilder::new();
    let path = (!lane.is_empty()).then(|| lanes.add_path(lane.to_vec()));

    let sim = SimBuilder::new(config)
        .graph(graph)
        .gates(gates)
        .lanes(lanes.build()?)
        .ped_config(ped_config)
        .build()?;
    Ok((sim, Scene { gate, near, far, path }))
}

/// Records everything the sim reports.
#[derive(Default)]
struct Recorder {
    started:  Vec<Tick>,
    ended:    Vec<(Tick, usize, usize)>,
    events:   Vec<(Tick, PedId, PedEvent)>,
    finished: Vec<VehicleId>,
    sim_end:  Option<Tick>,
}

impl Recorder {
    fn any(&self, pred: impl Fn(PedId, &PedEvent) -> bool) -> bool {
        self.events.iter().any(|(_, p, e)| pred(*p, e))
    }
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, tick: Tick) {
        self.started.push(tick);
    }

    fn on_ped_event(&mut self, tick: Tick, ped: PedId, event: &PedEvent) {
        self.events.push((tick, ped, event.clone()));
    }

    fn on_vehicle_finished(&mut self, _tick: Tick, vehicle: &VehicleAgent) {
        self.finished.push(vehicle.id());
    }

    fn on_tick_end(&mut self, tick: Tick, pedestrians: &[Pedestrian], vehicles: &VehicleFleet) {
        self.ended.push((tick, pedestrians.len(), vehicles.len()));
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.sim_end = Some(final_tick);
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_successfully_with_defaults() {
        let sim = SimBuilder::new(test_config(10)).build().unwrap();
        assert!(sim.pedestrians().is_empty());
        assert!(sim.vehicles().is_empty());
        assert_eq!(sim.clock.current_tick, Tick(0));
        assert!(sim.graph.is_empty());
        assert_eq!(sim.bus().subscriber_count(), 0);
    }

    #[test]
    fn zero_tick_duration_errors() {
        let mut config = test_config(10);
        config.tick_duration_secs = 0.0;
        let result = SimBuilder::new(config).build();
        assert!(matches!(result, Err(SimError::Core(CoreError::Config(_)))));
    }

    #[test]
    fn zero_threads_errors() {
        let mut config = test_config(10);
        config.num_threads = Some(0);
        assert!(SimBuilder::new(config).build().is_err());
    }

    #[test]
    fn crossing_bound_to_missing_gate_errors() {
        let mut b = NodeGraphBuilder::new();
        b.add_crossing_pair(v(0.0, 0.0), v(0.0, 8.0), Some(GateId(3)));
        let result = SimBuilder::new(test_config(10)).graph(b.build().unwrap()).build();
        assert!(matches!(
            result,
            Err(SimError::Signal(SignalError::UnknownGate(GateId(3))))
        ));
    }

    #[test]
    fn duplicate_stop_ids_error() {
        let stops = vec![
            StopMarker::new(StopId(1), v(0.0, 0.0), v(1.0, 0.0)),
            StopMarker::new(StopId(1), v(50.0, 0.0), v(1.0, 0.0)),
        ];
        let result = SimBuilder::new(test_config(10)).stops(stops).build();
        assert!(matches!(result, Err(SimError::DuplicateStop(StopId(1)))));
    }

    #[test]
    fn non_positive_cruise_speed_errors() {
        let config = VehicleConfig { cruise_speed: 0.0, ..VehicleConfig::default() };
        let result = SimBuilder::new(test_config(10)).vehicle_config(config).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn non_positive_walk_speed_errors() {
        let config = PedConfig { walk_speed: -1.0, ..PedConfig::default() };
        let result = SimBuilder::new(test_config(10)).ped_config(config).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn dangling_continuation_surfaces_as_lane_error() {
        let mut lanes = LaneNetworkBuilder::new();
        let a = lanes.add_path(vec![v(0.0, 0.0), v(5.0, 0.0)]);
        lanes.connect(a, PathId(7));
        let result: SimResult<()> = lanes.build().map(|_| ()).map_err(SimError::from);
        assert!(matches!(result, Err(SimError::Lane(_))));
    }

    #[test]
    fn short_lane_only_strands_its_vehicle() -> SimResult<()> {
        let mut b = LaneNetworkBuilder::new();
        let road = b.add_path(vec![v(0.0, 0.0), v(200.0, 0.0)]);
        let stub = b.add_path(vec![v(5.0, 5.0)]);
        let mut sim = SimBuilder::new(test_config(30)).lanes(b.build()?).build()?;

        let stuck = sim.spawn_vehicle(stub, false);
        let car = sim.spawn_vehicle(road, false);
        sim.run(&mut NoopObserver);

        assert!(sim.vehicles().get(stuck).unwrap().is_inert());
        assert!(sim.vehicles().get(car).unwrap().pos().x > 1.0);
        Ok(())
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    #[test]
    fn run_completes_all_ticks() {
        let mut sim = SimBuilder::new(test_config(24)).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec);

        assert_eq!(rec.started.len(), 24);
        assert_eq!(rec.ended.len(), 24);
        assert_eq!(rec.started.first(), Some(&Tick(0)));
        assert_eq!(rec.ended.last().map(|e| e.0), Some(Tick(23)));
        assert_eq!(rec.sim_end, Some(Tick(24)));
        assert_eq!(sim.clock.current_tick, Tick(24));
        assert!((sim.now_secs() - 2.4).abs() < 1e-9);
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let mut sim = SimBuilder::new(test_config(5)).build().unwrap();
        let mut rec = Recorder::default();
        sim.run_ticks(8, &mut rec);
        assert_eq!(sim.clock.current_tick, Tick(8));
        assert_eq!(rec.started.len(), 8);
        assert_eq!(rec.sim_end, None, "run_ticks does not end the run");
    }

    #[test]
    fn run_resumes_from_current_tick() {
        let mut sim = SimBuilder::new(test_config(10)).build().unwrap();
        sim.run_ticks(4, &mut NoopObserver);
        let mut rec = Recorder::default();
        sim.run(&mut rec);
        assert_eq!(rec.started.len(), 6);
        assert_eq!(rec.sim_end, Some(Tick(10)));
    }

    #[test]
    fn tick_end_reports_agent_counts() {
        let (mut sim, scene) =
            zebra_scene(test_config(3), PedConfig::default(), &[v(-50.0, 4.0), v(50.0, 4.0)]).unwrap();
        sim.spawn_pedestrian(PedRole::Normal, v(-10.0, -1.0), v(1.0, 0.0));
        sim.spawn_pedestrian(PedRole::Normal, v(-10.0, 9.0), v(1.0, 0.0));
        sim.spawn_vehicle(scene.path.unwrap(), false);

        let mut rec = Recorder::default();
        sim.run(&mut rec);
        assert!(rec.ended.iter().all(|&(_, peds, vehicles)| peds == 2 && vehicles == 1));
    }

    #[cfg(not(feature = "parallel"))]
    #[test]
    fn same_seed_same_trajectories() {
        let run = || {
            let (mut sim, _) = zebra_scene(test_config(400), PedConfig::default(), &[]).unwrap();
            for i in 0..6 {
                let role = if i % 2 == 0 { PedRole::Abnormal } else { PedRole::Normal };
                sim.spawn_pedestrian(role, v(-10.0, if i < 3 { -1.0 } else { 9.0 }), v(1.0, 0.0));
            }
            sim.run(&mut NoopObserver);
            sim.pedestrians().iter().map(Pedestrian::pos).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}

// ── Spawning and despawning ───────────────────────────────────────────────────

#[cfg(test)]
mod spawn_tests {
    use super::*;

    #[test]
    fn pedestrian_ids_are_sequential_and_snap_to_nodes() {
        let (mut sim, scene) = zebra_scene(test_config(10), PedConfig::default(), &[]).unwrap();
        let a = sim.spawn_pedestrian(PedRole::Normal, v(0.5, 0.5), v(0.0, 1.0));
        let b = sim.spawn_pedestrian(PedRole::Normal, v(50.0, 50.0), v(0.0, 1.0));
        assert_eq!((a, b), (PedId(0), PedId(1)));
        assert_eq!(sim.pedestrian(a).unwrap().current_node(), Some(scene.near));
        assert_eq!(sim.pedestrian(b).unwrap().current_node(), None);
    }

    #[test]
    fn enforcers_subscribe_and_unsubscribe() {
        let (mut sim, _) = zebra_scene(test_config(10), PedConfig::default(), &[]).unwrap();
        sim.spawn_pedestrian(PedRole::Normal, v(-10.0, -1.0), v(1.0, 0.0));
        let cop = sim.spawn_pedestrian(PedRole::Enforcer, v(-10.0, 9.0), v(1.0, 0.0));
        assert_eq!(sim.bus().subscriber_count(), 1);

        let removed = sim.despawn_pedestrian(cop).unwrap();
        assert_eq!(removed.id(), cop);
        assert_eq!(sim.bus().subscriber_count(), 0);
        assert!(sim.pedestrian(cop).is_none());
        assert!(sim.despawn_pedestrian(cop).is_none());
    }

    #[test]
    fn despawn_mid_crossing_releases_gate_and_claim() {
        let (mut sim, scene) = zebra_scene(test_config(10), PedConfig::default(), &[]).unwrap();
        let id = sim.spawn_pedestrian(PedRole::Normal, v(0.0, 0.0), v(0.0, 1.0));
        sim.step(&mut NoopObserver);

        let ped = sim.pedestrian(id).unwrap();
        assert_eq!(ped.state(), PedState::Crossing);
        assert_eq!(sim.gates.get(scene.gate).unwrap().occupancy(), 1);
        assert_eq!(sim.graph.claim_count(scene.far), 1);

        sim.despawn_pedestrian(id);
        assert_eq!(sim.gates.get(scene.gate).unwrap().occupancy(), 0);
        assert_eq!(sim.graph.claim_count(scene.far), 0);
    }

    #[test]
    fn vehicle_spawning_and_despawning() {
        let (mut sim, scene) =
            zebra_scene(test_config(10), PedConfig::default(), &[v(-50.0, 4.0), v(50.0, 4.0)]).unwrap();
        let a = sim.spawn_vehicle(scene.path.unwrap(), false);
        let b = sim.spawn_vehicle(PathId(9), false);
        let c = sim.spawn_vehicle_at(v(-20.0, 5.0), v(1.0, 0.0), true);

        assert_eq!((a, b, c), (VehicleId(0), VehicleId(1), VehicleId(2)));
        assert!(sim.vehicles().get(b).unwrap().is_inert());
        let placed = sim.vehicles().get(c).unwrap();
        assert!(placed.is_transit());
        assert!((placed.pos() - v(-20.0, 4.0)).length() < 1e-3);

        assert!(sim.despawn_vehicle(b));
        assert!(!sim.despawn_vehicle(b));
        assert_eq!(sim.vehicles().len(), 2);
    }

    #[test]
    fn finished_vehicles_are_reported_and_removed() {
        let (mut sim, scene) =
            zebra_scene(test_config(100), PedConfig::default(), &[v(10.0, 20.0), v(30.0, 20.0)]).unwrap();
        let id = sim.spawn_vehicle(scene.path.unwrap(), false);

        let mut rec = Recorder::default();
        sim.run(&mut rec);
        assert_eq!(rec.finished, vec![id]);
        assert!(sim.vehicles().is_empty());
    }
}

// ── Pedestrian and vehicle interplay ──────────────────────────────────────────

#[cfg(test)]
mod interplay_tests {
    use super::*;

    #[test]
    fn jaywalker_is_reported_chased_and_arrested() {
        // A car one metre from the zebra makes crossing illegal at tick 0.
        let (mut sim, scene) =
            zebra_scene(test_config(900), PedConfig::default(), &[v(1.0, 4.0), v(100.0, 4.0)]).unwrap();
        let car = sim.spawn_vehicle(scene.path.unwrap(), false);
        let offender = sim.spawn_pedestrian(PedRole::Abnormal, v(0.0, 0.0), v(0.0, 1.0));
        let cop = sim.spawn_pedestrian(PedRole::Enforcer, v(0.0, -20.0), v(0.0, 1.0));

        let seen: Arc<Mutex<Vec<Violation>>> = Arc::default();
        let sink = Arc::clone(&seen);
        sim.bus_mut().subscribe(Box::new(move |v: &Violation| sink.lock().unwrap().push(*v)));
        assert_eq!(sim.bus().subscriber_count(), 2);

        let mut rec = Recorder::default();
        sim.run(&mut rec);

        let seen = seen.lock().unwrap();
        assert!(!seen.is_empty());
        assert_eq!(seen[0].offender, offender);
        assert!((seen[0].time - 0.0).abs() < 1e-9, "reported on the first tick");

        assert!(rec.any(|p, e| p == offender && matches!(e, PedEvent::Violation(_))));
        assert!(rec.any(|p, e| p == cop && *e == PedEvent::ChaseStarted { offender }));
        assert!(rec.any(|p, e| p == cop && *e == PedEvent::Arrested { offender }));

        assert_eq!(rec.finished, vec![car], "the car drives off the end of its lane");
    }

    #[test]
    fn vehicle_waits_for_pedestrian_on_zebra() {
        let (mut sim, scene) =
            zebra_scene(test_config(300), PedConfig::default(), &[v(-15.0, 4.0), v(60.0, 4.0)]).unwrap();
        let car = sim.spawn_vehicle(scene.path.unwrap(), false);
        let ped = sim.spawn_pedestrian(PedRole::Normal, v(0.0, 0.0), v(0.0, 1.0));

        let mut rec = Recorder::default();
        let mut finished_at = None;
        for tick in 0..300 {
            sim.step(&mut rec);
            let done = rec.any(|p, e| p == ped && matches!(e, PedEvent::CrossingFinished { .. }));
            if !done {
                let x = sim.vehicles().get(car).unwrap().pos().x;
                assert!(x < 0.0, "car entered the zebra at tick {tick} (x = {x})");
            } else if finished_at.is_none() {
                finished_at = Some(tick);
            }
            if finished_at.is_some_and(|t| tick > t + 60) {
                break;
            }
        }

        assert!(rec.any(|p, e| p == ped && matches!(e, PedEvent::CrossingStarted { .. })));
        assert!(finished_at.is_some(), "pedestrian never reached the far curb");
        let car = sim.vehicles().get(car).unwrap();
        assert!(car.pos().x > 1.0, "car moves on once the zebra clears");
    }

    #[test]
    fn global_lock_is_recorded_by_the_sim() {
        let ped_config = PedConfig { lock_scope: LockScope::Global, ..PedConfig::default() };
        let (mut sim, scene) = zebra_scene(test_config(300), ped_config, &[]).unwrap();
        let id = sim.spawn_pedestrian(PedRole::Normal, v(0.0, 0.0), v(0.0, 1.0));

        let mut rec = Recorder::default();
        for _ in 0..300 {
            sim.step(&mut rec);
            if rec.any(|_, e| matches!(e, PedEvent::CrossingFinished { .. })) {
                break;
            }
        }

        assert_eq!(sim.global_lock().recent_count(), 1);
        let ped = sim.pedestrian(id).unwrap();
        assert_eq!(ped.crossing_lock().recent_count(), 0, "per-agent history untouched");
        assert_eq!(ped.current_node(), Some(scene.far));
    }

    #[test]
    fn claims_and_occupancy_stay_balanced() {
        let (mut sim, scene) =
            zebra_scene(test_config(1200), PedConfig::default(), &[v(-40.0, 4.0), v(40.0, 4.0)]).unwrap();
        let lane = scene.path.unwrap();
        sim.spawn_vehicle(lane, false);
        for i in 0..10 {
            let role = match i % 3 {
                0 => PedRole::Abnormal,
                1 => PedRole::Normal,
                _ => PedRole::Enforcer,
            };
            let pos = if i % 2 == 0 { v(-10.0, -1.0) } else { v(-10.0, 9.0) };
            sim.spawn_pedestrian(role, pos, v(1.0, 0.0));
        }

        for tick in 0..1200 {
            sim.step(&mut NoopObserver);
            if tick % 200 == 0 {
                sim.spawn_vehicle(lane, false);
            }
            let held: u32 = sim.graph.nodes().map(|(id, _)| sim.graph.claim_count(id)).sum();
            let holders = sim.pedestrians().iter().filter(|p| p.claimed().is_some()).count() as u32;
            assert_eq!(held, holders, "tick {tick}");
            let crossing = sim.pedestrians().iter().filter(|p| p.crossing_gate().is_some()).count() as u32;
            assert_eq!(sim.gates.total_occupancy(), crossing, "tick {tick}");
        }

        let ids: Vec<PedId> = sim.pedestrians().iter().map(Pedestrian::id).collect();
        for id in ids {
            sim.despawn_pedestrian(id);
        }
        assert!(sim.graph.nodes().all(|(id, _)| sim.graph.claim_count(id) == 0));
        assert_eq!(sim.gates.total_occupancy(), 0);
        assert_eq!(sim.bus().subscriber_count(), 0);
    }
}
