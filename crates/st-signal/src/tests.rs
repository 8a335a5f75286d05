//! Unit tests for st-signal.

use std::sync::Arc;

use st_core::{GateId, Vec2};

use crate::*;

fn controller(offset: f64) -> TrafficLightController {
    TrafficLightController::new(PhaseTimings::default(), 0.0, offset).unwrap()
}

// ── Phase schedule ────────────────────────────────────────────────────────────

#[cfg(test)]
mod schedule {
    use super::*;

    #[test]
    fn default_cycle_is_thirty_seconds() {
        assert_eq!(controller(0.0).cycle_length(), 30.0);
    }

    #[test]
    fn intervals_follow_the_cycle() {
        let c = controller(0.0);
        use SignalGroup::{A, B};
        use VehiclePhase::{Green, Red, Yellow};

        let expect = [
            (0.0, Green, Red),
            (11.9, Green, Red),
            (12.0, Yellow, Red),
            (14.0, Red, Red),
            (15.0, Red, Green),
            (27.0, Red, Yellow),
            (29.5, Red, Red),
            (30.0, Green, Red),
        ];
        for (t, a, b) in expect {
            assert_eq!(c.phase(A, t), a, "group A at {t}");
            assert_eq!(c.phase(B, t), b, "group B at {t}");
        }
    }

    #[test]
    fn phase_depends_only_on_cycle_position() {
        let c = TrafficLightController::new(PhaseTimings::symmetric(7.0, 1.5, 0.5), 3.0, 0.0).unwrap();
        let cycle = c.cycle_length();
        for step in 0..400 {
            // Half-step offset keeps samples clear of interval boundaries.
            let t = 3.05 + step as f64 * 0.1;
            for k in [-3.0, 1.0, 5.0, 100.0] {
                let later = t + k * cycle;
                assert_eq!(c.phase(SignalGroup::A, t), c.phase(SignalGroup::A, later));
                assert_eq!(c.phase(SignalGroup::B, t), c.phase(SignalGroup::B, later));
            }
        }
    }

    #[test]
    fn groups_are_never_both_green() {
        let c = controller(0.0);
        for step in 0..3000 {
            let t = step as f64 * 0.01;
            let both = c.phase(SignalGroup::A, t) == VehiclePhase::Green
                && c.phase(SignalGroup::B, t) == VehiclePhase::Green;
            assert!(!both, "both green at {t}");
        }
    }

    #[test]
    fn only_full_red_counts_as_red() {
        let c = controller(0.0);
        assert!(!c.is_vehicles_red(SignalGroup::A, 13.0), "yellow is not red");
        assert!(c.is_vehicles_red(SignalGroup::B, 13.0));
    }

    #[test]
    fn positive_offset_advances_the_cycle() {
        let c = TrafficLightController::new(PhaseTimings::default(), 100.0, 15.0).unwrap();
        assert_eq!(c.epoch(), 85.0);
        assert_eq!(c.phase(SignalGroup::B, 100.0), VehiclePhase::Green);

        let ignored = TrafficLightController::new(PhaseTimings::default(), 100.0, -5.0).unwrap();
        assert_eq!(ignored.epoch(), 100.0);
    }

    #[test]
    fn time_before_epoch_wraps() {
        let c = TrafficLightController::new(PhaseTimings::default(), 10.0, 0.0).unwrap();
        assert!((c.time_in_cycle(9.0) - 29.0).abs() < 1e-9);
        assert_eq!(c.phase(SignalGroup::A, 9.0), VehiclePhase::Red);
    }

    #[test]
    fn degenerate_cycle_is_one_second() {
        let c = TrafficLightController::new(PhaseTimings::symmetric(0.0, 0.0, 0.0), 0.0, 0.0).unwrap();
        assert_eq!(c.cycle_length(), 1.0);
        assert_eq!(c.phase(SignalGroup::A, 0.5), VehiclePhase::Red);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let timings = PhaseTimings { yellow_b: -1.0, ..PhaseTimings::default() };
        let err = TrafficLightController::new(timings, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, SignalError::BadDuration { field: "yellow_b", .. }));
    }

    #[test]
    fn other_group() {
        assert_eq!(SignalGroup::A.other(), SignalGroup::B);
        assert_eq!(SignalGroup::B.other(), SignalGroup::A);
    }
}

// ── Signal legs ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod legs {
    use super::*;

    #[test]
    fn leg_reports_its_group() {
        let shared = Arc::new(controller(0.0));
        let a = SignalLeg::new(Arc::clone(&shared), SignalGroup::A);
        let b = SignalLeg::new(shared, SignalGroup::B);
        assert_eq!(a.phase(5.0), VehiclePhase::Green);
        assert!(!a.is_red_for_vehicles(5.0));
        assert!(b.is_red_for_vehicles(5.0));
    }

    #[test]
    fn closures_are_sources() {
        let always_red = |_now: f64| VehiclePhase::Red;
        assert!(always_red.is_red_for_vehicles(0.0));
    }
}

// ── Crosswalk gates ───────────────────────────────────────────────────────────

#[cfg(test)]
mod gates {
    use super::*;

    fn at_distance(d: f32) -> impl Fn(Vec2) -> f32 + Sync {
        move |_| d
    }

    #[test]
    fn zebra_boundary_is_exclusive() {
        let gate = CrosswalkZone::zebra(Vec2::ZERO);
        assert!(!gate.can_pedestrian_start_crossing(0.0, &at_distance(3.0)));
        assert!(gate.can_pedestrian_start_crossing(0.0, &at_distance(3.01)));
        assert!(!gate.can_pedestrian_start_crossing(0.0, &at_distance(1.0)));
        assert!(gate.can_pedestrian_start_crossing(0.0, &NoVehicles));
    }

    #[test]
    fn zebra_opens_while_occupied() {
        let gate = CrosswalkZone::zebra(Vec2::ZERO);
        gate.notify_pedestrian_start();
        assert!(gate.can_pedestrian_start_crossing(0.0, &at_distance(0.5)));
        assert!(!gate.is_red_for_vehicles(0.0));
        assert!(gate.should_vehicles_stop(0.0));
        assert_eq!(gate.vehicle_phase(0.0), None);
    }

    #[test]
    fn occupancy_is_counted_not_flagged() {
        let gate = CrosswalkZone::zebra(Vec2::ZERO);
        gate.notify_pedestrian_start();
        gate.notify_pedestrian_start();
        gate.notify_pedestrian_end();
        assert!(gate.someone_is_crossing(), "second crosser still on the zebra");
        gate.notify_pedestrian_end();
        gate.notify_pedestrian_end();
        assert_eq!(gate.occupancy(), 0);
        assert!(!gate.someone_is_crossing());
    }

    #[test]
    fn signalised_follows_source() {
        let leg = SignalLeg::new(Arc::new(controller(0.0)), SignalGroup::A);
        let gate = CrosswalkZone::signalised(Vec2::ZERO, Arc::new(leg));
        // A green: vehicles go, pedestrians wait even with no traffic.
        assert!(!gate.can_pedestrian_start_crossing(5.0, &NoVehicles));
        assert!(!gate.should_vehicles_stop(5.0));
        assert_eq!(gate.vehicle_phase(5.0), Some(VehiclePhase::Green));
        // B green: A is red.
        assert!(gate.can_pedestrian_start_crossing(20.0, &at_distance(0.1)));
        assert!(gate.is_red_for_vehicles(20.0));
        assert!(gate.should_vehicles_stop(20.0));
    }

    #[test]
    fn signalised_without_source_never_opens() {
        let gate = CrosswalkZone::new(Vec2::ZERO, CrosswalkKind::Signalised);
        assert!(!gate.can_pedestrian_start_crossing(0.0, &NoVehicles));
        assert!(!gate.is_red_for_vehicles(0.0));
        assert_eq!(gate.vehicle_phase(0.0), None);
    }

    #[test]
    fn gate_set_assigns_ids() {
        let mut gates = GateSet::new();
        let a = gates.add(CrosswalkZone::zebra(Vec2::new(1.0, 0.0)));
        let b = gates.add(CrosswalkZone::zebra(Vec2::new(2.0, 0.0)).with_zebra_min_car_distance(5.0));
        assert_eq!((a, b), (GateId(0), GateId(1)));
        assert_eq!(gates.get(b).unwrap().id(), b);
        assert_eq!(gates.get(b).unwrap().zebra_min_car_distance, 5.0);
        assert!(gates.require(GateId(9)).is_err());

        gates.get(a).unwrap().notify_pedestrian_start();
        assert_eq!(gates.total_occupancy(), 1);
    }

    #[test]
    fn concurrent_start_end_balances() {
        let gate = CrosswalkZone::zebra(Vec2::ZERO);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        gate.notify_pedestrian_start();
                        gate.notify_pedestrian_end();
                    }
                });
            }
        });
        assert_eq!(gate.occupancy(), 0);
    }
}
