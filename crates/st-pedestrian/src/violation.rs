//! The violation bus: jaywalkers are reported here, enforcers listen.
//!
//! The bus is an explicit object owned by the simulation.  Publishing is
//! synchronous: every listener has been called, in subscription order,
//! before [`ViolationBus::publish`] returns.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use st_core::{PedId, Vec2};

// ── Violation ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ViolationReason {
    Jaywalk,
}

impl fmt::Display for ViolationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jaywalk => f.write_str("Jaywalk"),
        }
    }
}

/// One reported offence.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Violation {
    pub offender: PedId,
    pub reason:   ViolationReason,
    /// Where the offender was when the offence began.
    pub pos:      Vec2,
    /// Simulation seconds.
    pub time:     f64,
}

// ── Listeners ─────────────────────────────────────────────────────────────────

/// Receives every published violation.
pub trait ViolationListener: Send {
    fn on_violation(&mut self, violation: &Violation);
}

impl<F> ViolationListener for F
where
    F: FnMut(&Violation) + Send,
{
    fn on_violation(&mut self, violation: &Violation) {
        self(violation)
    }
}

/// A shared queue that collects violations for later draining.
///
/// Enforcers subscribe a clone of their inbox and drain it at the start of
/// their own tick.
#[derive(Clone, Debug, Default)]
pub struct ViolationInbox {
    queue: Arc<Mutex<VecDeque<Violation>>>,
}

impl ViolationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything received so far, oldest first.
    pub fn drain(&self) -> Vec<Violation> {
        let mut q = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        q.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ViolationListener for ViolationInbox {
    fn on_violation(&mut self, violation: &Violation) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(*violation);
    }
}

// ── ViolationBus ──────────────────────────────────────────────────────────────

/// Handle returned by [`ViolationBus::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Synchronous publish/subscribe dispatcher for violations.
#[derive(Default)]
pub struct ViolationBus {
    listeners: Vec<(SubscriptionId, Box<dyn ViolationListener>)>,
    next_id:   u64,
}

impl ViolationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn ViolationListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, violation: &Violation) {
        log::debug!(
            "violation: {} by {} at {} (t={:.2})",
            violation.reason,
            violation.offender,
            violation.pos,
            violation.time,
        );
        for (_, listener) in &mut self.listeners {
            listener.on_violation(violation);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for ViolationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViolationBus")
            .field("subscribers", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
