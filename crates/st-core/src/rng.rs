//! Deterministic per-agent RNG wrapper.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR (stream_key * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive agent IDs uniformly across the seed space.
//! Pedestrians and vehicles draw from disjoint stream keys (vehicles set the
//! top bit), so `PedId(3)` and `VehicleId(3)` never share a sequence.
//!
//! - Agents never share RNG state (no contention, no ordering dependency).
//! - Spawning more agents does not disturb the seeds of existing ones.
//! - All RNG calls are local to the owning agent; no synchronisation needed.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{PedId, Vec2, VehicleId};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Top bit separating the vehicle stream keys from the pedestrian ones.
const VEHICLE_STREAM: u64 = 1 << 63;

/// Per-agent deterministic RNG.
///
/// Owned by the agent it was created for.  The type is `Send` but not meant
/// to be shared; each agent draws from its own stream even when the agent
/// phases run on Rayon.
#[derive(Clone, Debug)]
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed from the run's global seed and an arbitrary stream key.
    pub fn new(global_seed: u64, stream: u64) -> Self {
        let seed = global_seed ^ stream.wrapping_mul(MIXING_CONSTANT);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// RNG stream for a pedestrian.
    pub fn for_pedestrian(global_seed: u64, id: PedId) -> Self {
        Self::new(global_seed, id.0 as u64)
    }

    /// RNG stream for a vehicle.
    pub fn for_vehicle(global_seed: u64, id: VehicleId) -> Self {
        Self::new(global_seed, VEHICLE_STREAM | id.0 as u64)
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Uniform `f32` in `[lo, hi]`.  Returns `lo` when the range is empty or
    /// inverted, so config values like `(1.0, 1.0)` are safe.
    #[inline]
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo { self.0.gen_range(lo..=hi) } else { lo }
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform point inside the unit disc (rejection sampling).
    pub fn inside_unit_circle(&mut self) -> Vec2 {
        loop {
            let p = Vec2::new(self.0.gen_range(-1.0..=1.0), self.0.gen_range(-1.0..=1.0));
            if p.length_sq() <= 1.0 {
                return p;
            }
        }
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
