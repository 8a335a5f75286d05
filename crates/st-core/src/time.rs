//! Simulation time model.
//!
//! # Design
//!
//! Time advances in fixed ticks.  The canonical counter is an integer
//! `Tick`; wall time in simulated seconds is derived from it:
//!
//!   now_secs = start_time_secs + tick * tick_duration_secs
//!
//! Deriving seconds from the tick (rather than accumulating `dt`) means a
//! run has no floating-point drift, which matters for the signal scheduler:
//! its phase is a pure function of `now_secs`, so two runs with the same
//! tick produce the same lights.
//!
//! Seconds are `f64` for the same reason; per-tick deltas handed to agents
//! are `f32`.

use std::fmt;

use crate::{CoreError, CoreResult};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and simulated seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Simulated time of tick 0, in seconds.
    pub start_time_secs: f64,
    /// How many simulated seconds one tick represents.
    pub tick_duration_secs: f64,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start_time_secs: f64, tick_duration_secs: f64) -> Self {
        Self {
            start_time_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.tick_duration_secs
    }

    /// Simulated time of `current_tick`.
    #[inline]
    pub fn now_secs(&self) -> f64 {
        self.start_time_secs + self.elapsed_secs()
    }

    /// Per-tick delta handed to agent integrators.
    #[inline]
    pub fn dt(&self) -> f32 {
        self.tick_duration_secs as f32
    }

    /// How many ticks span `secs` seconds? (rounds up)
    #[inline]
    pub fn ticks_for_secs(&self, secs: f64) -> u64 {
        (secs / self.tick_duration_secs).ceil().max(0.0) as u64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}s)", self.current_tick, self.now_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated time at tick 0, in seconds.  Signal controllers take their
    /// epoch relative to this.
    pub start_time_secs: f64,

    /// Seconds per tick.  30 Hz (`1/30`) is a good default for street scenes.
    pub tick_duration_secs: f64,

    /// Total ticks to simulate with `Sim::run`.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results
    /// (with the `parallel` feature off).
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_time_secs, self.tick_duration_secs)
    }

    /// Reject configurations that would stall or reverse the clock.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.tick_duration_secs.is_finite() && self.tick_duration_secs > 0.0) {
            return Err(CoreError::Config(format!(
                "tick_duration_secs must be positive, got {}",
                self.tick_duration_secs
            )));
        }
        if !self.start_time_secs.is_finite() {
            return Err(CoreError::Config("start_time_secs must be finite".into()));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_time_secs:    0.0,
            tick_duration_secs: 1.0 / 30.0,
            total_ticks:        30 * 60,
            seed:               42,
            num_threads:        None,
        }
    }
}
