//! Signal groups, vehicle phases, and cycle timings.

use std::fmt;

use crate::{SignalError, SignalResult};

/// Cycles at or below this length are treated as one second long.
pub const MIN_CYCLE_SECS: f32 = 0.01;

/// One of the two conflicting traffic directions at a junction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalGroup {
    /// Served first in every cycle.
    #[default]
    A,
    B,
}

impl SignalGroup {
    /// The conflicting group.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// What a vehicle approaching on one group sees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehiclePhase {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for VehiclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Green  => "green",
            Self::Yellow => "yellow",
            Self::Red    => "red",
        })
    }
}

/// Durations, in seconds, of the six intervals of one cycle:
/// GreenA, YellowA, AllRedA, GreenB, YellowB, AllRedB.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseTimings {
    pub green_a:   f32,
    pub yellow_a:  f32,
    pub all_red_a: f32,
    pub green_b:   f32,
    pub yellow_b:  f32,
    pub all_red_b: f32,
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self::symmetric(12.0, 2.0, 1.0)
    }
}

impl PhaseTimings {
    /// Same green/yellow/all-red durations for both groups.
    pub fn symmetric(green: f32, yellow: f32, all_red: f32) -> Self {
        Self {
            green_a:   green,
            yellow_a:  yellow,
            all_red_a: all_red,
            green_b:   green,
            yellow_b:  yellow,
            all_red_b: all_red,
        }
    }

    /// Sum of all six intervals, with degenerate cycles forced to 1 s.
    pub fn cycle_length(&self) -> f32 {
        let cycle = self.green_a
            + self.yellow_a
            + self.all_red_a
            + self.green_b
            + self.yellow_b
            + self.all_red_b;
        if cycle <= MIN_CYCLE_SECS { 1.0 } else { cycle }
    }

    /// Reject negative or non-finite durations.
    pub fn validate(&self) -> SignalResult<()> {
        let fields = [
            ("green_a", self.green_a),
            ("yellow_a", self.yellow_a),
            ("all_red_a", self.all_red_a),
            ("green_b", self.green_b),
            ("yellow_b", self.yellow_b),
            ("all_red_b", self.all_red_b),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SignalError::BadDuration { field, value });
            }
        }
        Ok(())
    }
}
