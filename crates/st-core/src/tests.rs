//! Unit tests for st-core primitives.

#[cfg(test)]
mod ids {
    use crate::{GateId, NodeId, PedId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = PedId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(PedId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(GateId::default(), GateId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(VehicleId(7).to_string(), "VehicleId(7)");
    }
}

#[cfg(test)]
mod geo {
    use std::f32::consts::FRAC_PI_2;

    use crate::{Segment, Vec2};

    #[test]
    fn normalized_or_falls_back_on_zero() {
        assert_eq!(Vec2::ZERO.normalized_or(Vec2::FORWARD), Vec2::FORWARD);
        let n = Vec2::new(3.0, 4.0).normalized_or(Vec2::FORWARD);
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn move_towards_never_overshoots() {
        let p = Vec2::ZERO.move_towards(Vec2::new(1.0, 0.0), 5.0);
        assert_eq!(p, Vec2::new(1.0, 0.0));
        let q = Vec2::ZERO.move_towards(Vec2::new(10.0, 0.0), 2.0);
        assert!((q.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn rotate_towards_is_bounded() {
        let east = Vec2::new(1.0, 0.0);
        let north = Vec2::new(0.0, 1.0);
        let step = east.rotate_towards(north, 0.1);
        let angle = step.y.atan2(step.x);
        assert!((angle - 0.1).abs() < 1e-5, "got {angle}");

        // A large enough budget snaps to the target.
        let snapped = east.rotate_towards(north, FRAC_PI_2 + 0.01);
        assert!((snapped - north).length() < 1e-5);
    }

    #[test]
    fn rotate_towards_turns_clockwise_when_shorter() {
        let north = Vec2::new(0.0, 1.0);
        let east = Vec2::new(1.0, 0.0);
        let step = north.rotate_towards(east, 0.2);
        assert!(step.x > 0.0, "should have turned toward east, got {step}");
    }

    #[test]
    fn crossing_segments_intersect() {
        let a = Segment::new(Vec2::new(-1.0, 0.0), Vec2::new(1.0, 0.0));
        let b = Segment::new(Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let a = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0));
        let b = Segment::new(Vec2::new(0.0, 1.0), Vec2::new(5.0, 1.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn touching_endpoint_counts() {
        let a = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = Segment::new(Vec2::new(1.0, 1.0), Vec2::new(2.0, 0.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn closest_point_clamps_to_ends() {
        let s = Segment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0));
        assert_eq!(s.closest_point(Vec2::new(5.0, 3.0)), Vec2::new(5.0, 0.0));
        assert_eq!(s.closest_point(Vec2::new(-4.0, 1.0)), Vec2::new(0.0, 0.0));
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn clock_derives_seconds_from_tick() {
        let mut clock = SimClock::new(100.0, 0.5);
        assert_eq!(clock.now_secs(), 100.0);
        for _ in 0..4 {
            clock.advance();
        }
        assert_eq!(clock.elapsed_secs(), 2.0);
        assert_eq!(clock.now_secs(), 102.0);
        assert_eq!(clock.ticks_for_secs(1.2), 3);
    }

    #[test]
    fn validate_rejects_zero_tick() {
        let config = SimConfig { tick_duration_secs: 0.0, ..SimConfig::default() };
        assert!(config.validate().is_err());
        assert!(SimConfig::default().validate().is_ok());
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentRng, PedId, VehicleId};

    #[test]
    fn same_seed_same_sequence() {
        let mut a = AgentRng::for_pedestrian(7, PedId(3));
        let mut b = AgentRng::for_pedestrian(7, PedId(3));
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1000u32), b.gen_range(0..1000u32));
        }
    }

    #[test]
    fn ped_and_vehicle_streams_differ() {
        let mut p = AgentRng::for_pedestrian(7, PedId(3));
        let mut v = AgentRng::for_vehicle(7, VehicleId(3));
        let ps: Vec<u32> = (0..8).map(|_| p.gen_range(0..u32::MAX)).collect();
        let vs: Vec<u32> = (0..8).map(|_| v.gen_range(0..u32::MAX)).collect();
        assert_ne!(ps, vs);
    }

    #[test]
    fn inside_unit_circle_stays_inside() {
        let mut r = AgentRng::new(1, 1);
        for _ in 0..200 {
            assert!(r.inside_unit_circle().length() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn range_f32_handles_degenerate_range() {
        let mut r = AgentRng::new(1, 2);
        assert_eq!(r.range_f32(2.0, 2.0), 2.0);
        assert_eq!(r.range_f32(3.0, 1.0), 3.0);
    }
}
