//! Crossing-rate limiting.
//!
//! An agent that keeps crossing back and forth across the same street looks
//! wrong and clogs crosswalks.  Each completed crossing is recorded in a
//! rolling window; once the window holds `limit` crossings the agent is
//! locked out of crossing nodes for `cooldown_secs`.

use std::collections::VecDeque;

/// Tuning for [`CrossingLock`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossingLockConfig {
    /// Crossings inside the window that trigger a lockout.
    pub limit:         u32,
    /// Length of the trailing window, in seconds.
    pub window_secs:   f64,
    /// Lockout length, in seconds from the triggering crossing.
    pub cooldown_secs: f64,
}

impl Default for CrossingLockConfig {
    fn default() -> Self {
        Self { limit: 2, window_secs: 30.0, cooldown_secs: 15.0 }
    }
}

/// Who shares a crossing history.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LockScope {
    /// Every agent keeps its own history.
    #[default]
    PerAgent,
    /// One history for the whole population, owned by the simulation.
    Global,
}

/// Rolling crossing history plus the time until which crossings are barred.
#[derive(Clone, Debug, Default)]
pub struct CrossingLock {
    history:    VecDeque<f64>,
    lock_until: f64,
}

impl CrossingLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a crossing completed at `now`.
    ///
    /// Prunes timestamps older than the window, appends `now`, and pushes
    /// `lock_until` forward once the window holds `limit` crossings.
    /// Returns `true` if this call started or extended a lockout.
    pub fn record(&mut self, now: f64, config: &CrossingLockConfig) -> bool {
        while self.history.front().is_some_and(|&t| now - t > config.window_secs) {
            self.history.pop_front();
        }
        self.history.push_back(now);

        if self.history.len() >= config.limit as usize {
            let until = now + config.cooldown_secs;
            if until > self.lock_until {
                self.lock_until = until;
                return true;
            }
        }
        false
    }

    #[inline]
    pub fn is_locked(&self, now: f64) -> bool {
        now < self.lock_until
    }

    #[inline]
    pub fn lock_until(&self) -> f64 {
        self.lock_until
    }

    /// Crossings currently held in the window (not pruned until the next
    /// `record`).
    pub fn recent_count(&self) -> usize {
        self.history.len()
    }
}
