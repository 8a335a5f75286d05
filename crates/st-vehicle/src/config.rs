//! Vehicle tuning.

/// Shared tuning for every vehicle in a simulation.  Distances in metres,
/// speeds in m/s, times in seconds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleConfig {
    // ── Speed ─────────────────────────────────────────────────────────────
    pub cruise_speed:          f32,
    /// Rate at which speed rises toward a higher target, m/s².
    pub accel:                 f32,
    /// Rate at which speed falls toward a lower target, m/s².
    pub decel:                 f32,

    // ── Yield ─────────────────────────────────────────────────────────────
    /// Crosswalks farther than this are ignored.
    pub gate_lookahead:        f32,
    /// Minimum `dot(heading, dir_to_gate)` for a gate to count as ahead.
    pub gate_forward_dot:      f32,
    /// Yield checks are skipped this long after leaving a junction on green.
    pub junction_grace_secs:   f32,

    // ── Car following ─────────────────────────────────────────────────────
    /// Reach of the forward probe used when no same-path leader exists.
    pub follow_probe:          f32,
    pub follow_probe_dot:      f32,
    pub probe_half_width:      f32,
    pub min_gap:               f32,
    pub time_headway:          f32,

    // ── Transit ───────────────────────────────────────────────────────────
    /// Braking toward a stop starts this far out.
    pub stop_approach:         f32,
    /// Within this distance of a stop counts as at it.
    pub stop_tolerance:        f32,
    /// Below this speed a vehicle counts as stopped.
    pub stopped_speed:         f32,
    pub dwell_secs:            f64,
    /// A stop cannot trigger again for this long after a dwell.
    pub stop_cooldown_secs:    f64,

    // ── Steering ──────────────────────────────────────────────────────────
    pub heading_lookahead:     f32,
    /// Radians per second.
    pub max_turn_rate:         f32,

    // ── Placement ─────────────────────────────────────────────────────────
    /// Forward test used when dropping a hand-placed vehicle onto a lane.
    pub spawn_min_forward_dot: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            cruise_speed:          8.0,
            accel:                 3.0,
            decel:                 8.0,
            gate_lookahead:        10.0,
            gate_forward_dot:      0.7,
            junction_grace_secs:   2.0,
            follow_probe:          20.0,
            follow_probe_dot:      0.9,
            probe_half_width:      1.5,
            min_gap:               6.0,
            time_headway:          1.2,
            stop_approach:         6.0,
            stop_tolerance:        0.5,
            stopped_speed:         0.05,
            dwell_secs:            5.0,
            stop_cooldown_secs:    10.0,
            heading_lookahead:     3.0,
            max_turn_rate:         4.0,
            spawn_min_forward_dot: 0.2,
        }
    }
}
