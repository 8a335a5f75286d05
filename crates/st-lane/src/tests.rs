//! Unit tests for st-lane.

use st_core::{AgentRng, PathId, Vec2};

use crate::*;

fn v(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

fn close(a: Vec2, b: Vec2) -> bool {
    a.distance(b) < 1e-4
}

/// An L-shaped path: 10 m east, then 10 m north.
fn ell() -> LanePath {
    LanePath::bake(PathId(0), vec![v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0)], Vec::new()).unwrap()
}

// ── Baking ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod bake {
    use super::*;

    #[test]
    fn rejects_short_input() {
        let err = LanePath::bake(PathId(3), vec![v(1.0, 1.0)], Vec::new()).unwrap_err();
        assert!(matches!(err, LaneError::TooFewPoints { points: 1, .. }));
        assert!(LanePath::bake(PathId(3), Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn rejects_degenerate_path() {
        let err = LanePath::bake(PathId(0), vec![v(2.0, 2.0), v(2.0, 2.0)], Vec::new()).unwrap_err();
        assert!(matches!(err, LaneError::ZeroLength(PathId(0))));
    }

    #[test]
    fn length_is_sum_of_segments() {
        let p = ell();
        assert_eq!(p.length(), 20.0);
        assert_eq!(p.segment_count(), 2);
        assert_eq!(p.start(), v(0.0, 0.0));
        assert_eq!(p.end(), v(10.0, 10.0));
    }
}

// ── Along-path queries ────────────────────────────────────────────────────────

#[cfg(test)]
mod queries {
    use super::*;

    #[test]
    fn locate_crosses_segment_boundaries() {
        let p = ell();
        assert_eq!(p.locate(0.0), (0, 0.0));
        assert_eq!(p.locate(4.0), (0, 4.0));
        assert_eq!(p.locate(10.0), (1, 0.0));
        assert_eq!(p.locate(15.0), (1, 5.0));
        assert_eq!(p.locate(20.0), (1, 10.0));
    }

    #[test]
    fn out_of_range_is_clamped() {
        let p = ell();
        assert_eq!(p.locate(-3.0), (0, 0.0));
        assert!(close(p.point_at(99.0), v(10.0, 10.0)));
        assert!(close(p.point_at(-1.0), v(0.0, 0.0)));
    }

    #[test]
    fn point_and_direction() {
        let p = ell();
        assert!(close(p.point_at(5.0), v(5.0, 0.0)));
        assert!(close(p.point_at(12.5), v(10.0, 2.5)));
        assert!(close(p.direction_at(5.0), v(1.0, 0.0)));
        assert!(close(p.direction_at(12.5), v(0.0, 1.0)));
    }

    #[test]
    fn duplicate_points_keep_a_direction() {
        let p = LanePath::bake(
            PathId(0),
            vec![v(0.0, 0.0), v(0.0, 0.0), v(0.0, 5.0), v(0.0, 5.0)],
            Vec::new(),
        )
        .unwrap();
        assert!(close(p.direction_at(0.0), v(0.0, 1.0)));
        assert!(close(p.direction_at(5.0), v(0.0, 1.0)));
        assert!(close(p.point_at(2.0), v(0.0, 2.0)));
    }

    #[test]
    fn project_respects_direction() {
        let p = ell();
        // Standing beside the northbound leg but facing east: only the east
        // leg passes the forward test, so the projection clamps to its end.
        assert_eq!(p.project(v(11.0, 6.0), v(1.0, 0.0), 0.2), Some(10.0));
        let north = p.project(v(11.0, 6.0), v(0.0, 1.0), 0.2).unwrap();
        assert!((north - 16.0).abs() < 1e-4);
        assert_eq!(p.project(v(5.0, 5.0), v(-1.0, 0.0), 0.2), None);
    }

    #[test]
    fn pick_next_is_uniform_over_candidates() {
        let p = LanePath::bake(PathId(0), vec![v(0.0, 0.0), v(1.0, 0.0)], vec![PathId(1), PathId(2)]).unwrap();
        let mut rng = AgentRng::new(7, 0);
        let mut seen = [0u32; 3];
        for _ in 0..400 {
            seen[p.pick_next(&mut rng).unwrap().index()] += 1;
        }
        assert_eq!(seen[0], 0);
        assert!(seen[1] > 120 && seen[2] > 120, "roughly even split: {seen:?}");

        assert_eq!(ell().pick_next(&mut rng), None);
    }
}

// ── Networks ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod network {
    use super::*;

    #[test]
    fn unknown_continuation_is_rejected() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_path(vec![v(0.0, 0.0), v(5.0, 0.0)]);
        b.connect(a, PathId(4));
        assert!(matches!(b.build(), Err(LaneError::UnknownNext { next: PathId(4), .. })));
    }

    #[test]
    fn unbakeable_paths_are_left_unresolvable() {
        let mut b = LaneNetworkBuilder::new();
        let good = b.add_path(vec![v(0.0, 0.0), v(10.0, 0.0)]);
        let short = b.add_path(vec![v(10.0, 0.0)]);
        let flat = b.add_path(vec![v(3.0, 3.0), v(3.0, 3.0)]);
        let after = b.add_path(vec![v(10.0, 0.0), v(10.0, 10.0)]);
        b.connect(good, short).connect(good, after).connect(good, flat);

        let lanes = b.build().unwrap();
        assert!(lanes.get(short).is_none());
        assert!(lanes.get(flat).is_none());
        assert!(matches!(lanes.require(short), Err(LaneError::UnknownPath(_))));
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes.get(good).unwrap().next(), &[after]);
        assert_eq!(lanes.nearest_start(v(10.0, 0.0)), Some(after));

        let mut rng = AgentRng::new(1, 1);
        let mut cur = PathCursor::at_start(short);
        assert_eq!(cur.advance(&lanes, 1.0, &mut rng), CursorStep::Finished);
        assert!(cur.position(&lanes).is_none());
    }

    #[test]
    fn nearest_start_picks_closest_first_point() {
        let mut b = LaneNetworkBuilder::new();
        b.add_path(vec![v(0.0, 0.0), v(5.0, 0.0)]);
        let far_end = b.add_path(vec![v(30.0, 0.0), v(0.5, 0.0)]);
        let lanes = b.build().unwrap();
        assert_eq!(lanes.nearest_start(v(28.0, 1.0)), Some(far_end));
        assert_eq!(lanes.nearest_start(v(1.0, 0.0)), Some(PathId(0)));
        assert_eq!(LaneNetwork::empty().nearest_start(v(0.0, 0.0)), None);
        assert!(lanes.require(PathId(9)).is_err());
    }
}

// ── Cursor ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cursor {
    use super::*;

    fn network(loop_first: bool) -> (LaneNetwork, PathId, PathId) {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_path(vec![v(0.0, 0.0), v(10.0, 0.0)]);
        let c = b.add_path(vec![v(10.0, 0.0), v(10.0, 10.0)]);
        b.set_loop(a, loop_first);
        (b.build().unwrap(), a, c)
    }

    #[test]
    fn moves_within_a_path() {
        let (lanes, a, _) = network(false);
        let mut rng = AgentRng::new(1, 1);
        let mut cur = PathCursor::at_start(a);
        assert_eq!(cur.advance(&lanes, 4.0, &mut rng), CursorStep::Moved);
        assert!(close(cur.position(&lanes).unwrap(), v(4.0, 0.0)));
        assert_eq!(cur.remaining(&lanes), 6.0);
    }

    #[test]
    fn finishes_at_dead_end() {
        let (lanes, a, _) = network(false);
        let mut rng = AgentRng::new(1, 1);
        let mut cur = PathCursor::new(a, 8.0);
        assert_eq!(cur.advance(&lanes, 5.0, &mut rng), CursorStep::Finished);
        assert_eq!(cur.distance, 10.0);
    }

    #[test]
    fn loops_with_overflow() {
        let (lanes, a, _) = network(true);
        let mut rng = AgentRng::new(1, 1);
        let mut cur = PathCursor::new(a, 8.0);
        assert_eq!(cur.advance(&lanes, 5.0, &mut rng), CursorStep::Looped);
        assert!((cur.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn continuation_wins_over_loop() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_path(vec![v(0.0, 0.0), v(10.0, 0.0)]);
        let c = b.add_path(vec![v(10.0, 0.0), v(10.0, 10.0)]);
        b.connect(a, c).set_loop(a, true);
        let lanes = b.build().unwrap();

        let mut rng = AgentRng::new(1, 1);
        let mut cur = PathCursor::new(a, 9.0);
        assert_eq!(cur.advance(&lanes, 3.0, &mut rng), CursorStep::Continued { from: a, to: c });
        assert_eq!(cur.path, c);
        assert!(close(cur.position(&lanes).unwrap(), v(10.0, 2.0)));
        assert!(close(cur.direction(&lanes).unwrap(), v(0.0, 1.0)));
    }

    #[test]
    fn missing_path_is_finished() {
        let (lanes, _, _) = network(false);
        let mut rng = AgentRng::new(1, 1);
        let mut cur = PathCursor::at_start(PathId(42));
        assert_eq!(cur.advance(&lanes, 1.0, &mut rng), CursorStep::Finished);
        assert_eq!(cur.position(&lanes), None);
    }

    #[test]
    fn point_ahead_clamps_to_path_end() {
        let (lanes, a, _) = network(false);
        let cur = PathCursor::new(a, 9.0);
        assert!(close(cur.point_ahead(&lanes, 3.0).unwrap(), v(10.0, 0.0)));
    }
}
