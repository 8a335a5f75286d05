//! Pedestrian tuning, roles, and externally visible state.

use st_nav::{CrossingLockConfig, LockScope, RetryPolicy};

/// How a pedestrian treats crossing rules.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PedRole {
    /// Waits at the curb until the gate allows crossing.
    #[default]
    Normal,
    /// Crosses regardless and gets reported for it.
    Abnormal,
    /// Obeys the rules and chases reported offenders it can see.
    Enforcer,
}

/// The coarse state a presentation layer animates from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PedState {
    Wander,
    Crossing,
    Chase,
}

/// Shared tuning for every pedestrian in a simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PedConfig {
    // ── Walking ───────────────────────────────────────────────────────────
    /// Base walking speed in m/s, scaled per agent by `speed_multiplier_range`.
    pub walk_speed:             f32,
    pub speed_multiplier_range: (f32, f32),
    /// Within this distance of a destination counts as arrived.
    pub arrival_radius:         f32,
    /// Radius of the random offset around a node's position.
    pub arrival_jitter:         f32,
    /// Queue spacing per claimed slot at bus stops.
    pub bus_stop_slot_spacing:  f32,
    /// Pause after reaching a node, seconds.
    pub idle_range:             (f32, f32),
    /// Extra pause at bus stops, seconds.
    pub bus_stop_extra_idle:    (f32, f32),

    // ── Node picking ──────────────────────────────────────────────────────
    /// Forward-cone threshold for the first candidate pass.
    pub node_min_dot:           f32,
    /// Search radius when the current node is unknown.
    pub default_search_radius:  f32,
    /// Spawned pedestrians snap to a node within this distance.
    pub spawn_snap_radius:      f32,
    /// Pedestrians that lost their node look for one within this distance.
    pub reacquire_radius:       f32,
    /// Random candidates tried per pick.
    pub max_pick_tries:         usize,
    pub retry:                  RetryPolicy,

    // ── Crossing ──────────────────────────────────────────────────────────
    /// How far past the far curb a single-sided crossing aims.
    pub far_curb_overshoot:     f32,
    pub lock:                   CrossingLockConfig,
    pub lock_scope:             LockScope,

    // ── Enforcement ───────────────────────────────────────────────────────
    pub view_distance:          f32,
    /// Full field-of-view angle, degrees.
    pub view_fov_degrees:       f32,
    /// An offender unseen for longer than this is given up on.
    pub forget_secs:            f64,
    pub arrest_distance:        f32,
    pub chase_speed_multiplier: f32,
}

impl Default for PedConfig {
    fn default() -> Self {
        Self {
            walk_speed:             1.4,
            speed_multiplier_range: (0.9, 1.2),
            arrival_radius:         1.2,
            arrival_jitter:         0.5,
            bus_stop_slot_spacing:  0.9,
            idle_range:             (0.5, 2.0),
            bus_stop_extra_idle:    (1.0, 3.0),

            node_min_dot:           0.0,
            default_search_radius:  15.0,
            spawn_snap_radius:      6.0,
            reacquire_radius:       10.0,
            max_pick_tries:         6,
            retry:                  RetryPolicy::default(),

            far_curb_overshoot:     2.0,
            lock:                   CrossingLockConfig::default(),
            lock_scope:             LockScope::PerAgent,

            view_distance:          25.0,
            view_fov_degrees:       120.0,
            forget_secs:            4.0,
            arrest_distance:        1.2,
            chase_speed_multiplier: 1.8,
        }
    }
}
