//! crossroads: a two-minute street scene for street_sim.
//!
//! Pedestrians of every role wander the sidewalks of a signalised junction
//! while cars and a bus drive through it.  Vehicles that reach the end of
//! their lane are respawned at its start, so traffic keeps flowing for the
//! whole run.
//!
//! `RUST_LOG=debug cargo run -p crossroads` shows every violation, chase,
//! and abandoned crossing as it happens.

mod scene;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Result;

use st_core::{PathId, PedId, SimConfig, Tick, Vec2};
use st_pedestrian::{PedEvent, PedRole, PedState, Pedestrian, Violation};
use st_sim::{SimBuilder, SimObserver};
use st_vehicle::{VehicleAgent, VehicleFleet};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:            u64 = 42;
const TICKS_PER_SEC:   u64 = 30;
const SIM_SECS:        u64 = 120;
const REPORT_EVERY:    u64 = 10 * TICKS_PER_SEC;

const NORMALS:         usize = 14;
const ABNORMALS:       usize = 4;
const ENFORCERS:       usize = 2;

// ── Observer ──────────────────────────────────────────────────────────────────

/// Tallies pedestrian events and remembers which vehicles to respawn.
#[derive(Default)]
struct Tally {
    crossings:     usize,
    abandoned:     usize,
    chases:        usize,
    arrests:       usize,
    lost:          usize,
    pick_failures: usize,
    finished:      usize,
    respawn:       Vec<(PathId, bool)>,
    states:        BTreeMap<&'static str, usize>,
    moving:        usize,
}

impl SimObserver for Tally {
    fn on_ped_event(&mut self, _tick: Tick, _ped: PedId, event: &PedEvent) {
        match event {
            PedEvent::CrossingStarted { .. } => self.crossings += 1,
            PedEvent::CrossingAbandoned { .. } => self.abandoned += 1,
            PedEvent::ChaseStarted { .. } => self.chases += 1,
            PedEvent::Arrested { .. } => self.arrests += 1,
            PedEvent::ChaseAbandoned { .. } => self.lost += 1,
            PedEvent::PickFailed { .. } => self.pick_failures += 1,
            PedEvent::Violation(_) | PedEvent::CrossingFinished { .. } => {}
        }
    }

    fn on_vehicle_finished(&mut self, _tick: Tick, vehicle: &VehicleAgent) {
        self.finished += 1;
        if let Some(path) = vehicle.path() {
            self.respawn.push((path, vehicle.is_transit()));
        }
    }

    fn on_tick_end(&mut self, tick: Tick, pedestrians: &[Pedestrian], vehicles: &VehicleFleet) {
        if (tick.0 + 1) % REPORT_EVERY != 0 {
            return;
        }
        self.states.clear();
        for p in pedestrians {
            let name = match p.state() {
                PedState::Wander => "wander",
                PedState::Crossing => "crossing",
                PedState::Chase => "chase",
            };
            *self.states.entry(name).or_default() += 1;
        }
        self.moving = vehicles.iter().filter(|v| v.speed() > 0.5).count();
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== crossroads: street_sim ===");
    println!(
        "Pedestrians: {} normal, {} abnormal, {} enforcer  |  {SIM_SECS} s  |  Seed: {SEED}",
        NORMALS, ABNORMALS, ENFORCERS
    );
    println!();

    // 1. Scene.
    let config = SimConfig {
        start_time_secs:    0.0,
        tick_duration_secs: 1.0 / TICKS_PER_SEC as f64,
        total_ticks:        SIM_SECS * TICKS_PER_SEC,
        seed:               SEED,
        num_threads:        None,
    };
    let lanes = scene::build_lanes()?;
    let (eastbound, westbound, northbound, southbound) =
        (lanes.eastbound, lanes.westbound, lanes.northbound, lanes.southbound);

    let mut sim = SimBuilder::new(config.clone())
        .graph(scene::build_graph()?)
        .gates(scene::build_gates(config.start_time_secs)?)
        .lanes(lanes.network)
        .stops(scene::build_stops())
        .line_of_sight(scene::build_walls())
        .nav_surface(scene::walkable())
        .build()?;

    // 2. Tickets: an external violation listener.
    let tickets: Arc<Mutex<Vec<Violation>>> = Arc::default();
    let sink = Arc::clone(&tickets);
    sim.bus_mut().subscribe(Box::new(move |v: &Violation| {
        if let Ok(mut t) = sink.lock() {
            t.push(*v);
        }
    }));

    // 3. Pedestrians, spread over the sidewalk nodes.
    let sidewalk: Vec<Vec2> = sim.graph.nodes().map(|(_, n)| n.pos).collect();
    let roles = std::iter::repeat_n(PedRole::Normal, NORMALS)
        .chain(std::iter::repeat_n(PedRole::Abnormal, ABNORMALS))
        .chain(std::iter::repeat_n(PedRole::Enforcer, ENFORCERS));
    for (i, role) in roles.enumerate() {
        let pos = sidewalk[(i * 7) % sidewalk.len()];
        let facing = if pos.x < 0.0 { Vec2::new(1.0, 0.0) } else { Vec2::new(-1.0, 0.0) };
        sim.spawn_pedestrian(role, pos, facing);
    }

    // 4. Traffic: one bus and a car or two per lane.
    sim.spawn_vehicle(eastbound, true);
    sim.spawn_vehicle_at(Vec2::new(-40.0, -2.0), Vec2::new(1.0, 0.0), false);
    sim.spawn_vehicle(westbound, false);
    sim.spawn_vehicle_at(Vec2::new(30.0, 2.0), Vec2::new(-1.0, 0.0), false);
    sim.spawn_vehicle(northbound, false);
    sim.spawn_vehicle(southbound, false);
    println!(
        "Scene: {} nodes, {} gates, {} pedestrians, {} vehicles",
        sim.graph.node_count(),
        sim.gates.len(),
        sim.pedestrians().len(),
        sim.vehicles().len()
    );
    println!();

    // 5. Run, topping traffic up between reports.
    let mut tally = Tally::default();
    let t0 = Instant::now();
    while sim.clock.current_tick < config.end_tick() {
        let left = config.end_tick() - sim.clock.current_tick;
        sim.run_ticks(REPORT_EVERY.min(left), &mut tally);
        for (path, transit) in tally.respawn.drain(..) {
            sim.spawn_vehicle(path, transit);
        }
        log::info!(
            "t={:>5.1}s  peds {:?}  vehicles {} ({} moving)  occupancy {}",
            sim.now_secs(),
            tally.states,
            sim.vehicles().len(),
            tally.moving,
            sim.gates.total_occupancy(),
        );
    }
    tally.on_sim_end(sim.clock.current_tick);
    let elapsed = t0.elapsed();

    // 6. Summary.
    let tickets = tickets.lock().map(|t| t.clone()).unwrap_or_default();
    println!();
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  crossings started  : {}", tally.crossings);
    println!("  crossings abandoned: {}", tally.abandoned);
    println!("  jaywalk tickets    : {}", tickets.len());
    println!("  chases             : {} ({} arrests, {} lost)", tally.chases, tally.arrests, tally.lost);
    println!("  failed node picks  : {}", tally.pick_failures);
    println!("  vehicles recycled  : {}", tally.finished);
    println!();

    println!("{:<8} {:<10} {:<10} {:<16}", "Ped", "Role", "State", "Position");
    println!("{}", "-".repeat(46));
    for p in sim.pedestrians() {
        println!(
            "{:<8} {:<10} {:<10} {:<16}",
            p.id().0,
            format!("{:?}", p.role()),
            format!("{:?}", p.state()),
            p.pos().to_string(),
        );
    }

    Ok(())
}
