//! The vehicle-signal capability consumed by crosswalk gates.

use std::sync::Arc;

use crate::{SignalGroup, TrafficLightController, VehiclePhase};

/// Anything that can tell a gate what vehicles on its approach see.
///
/// Implemented by [`SignalLeg`] and by any `Fn(f64) -> VehiclePhase`
/// closure, which is handy for scripted tests.
pub trait VehicleSignalSource: Send + Sync {
    /// Vehicle phase at simulation time `now`.
    fn phase(&self, now: f64) -> VehiclePhase;

    /// `true` iff vehicles face a full red at `now`.
    fn is_red_for_vehicles(&self, now: f64) -> bool {
        self.phase(now) == VehiclePhase::Red
    }
}

impl<F> VehicleSignalSource for F
where
    F: Fn(f64) -> VehiclePhase + Send + Sync,
{
    fn phase(&self, now: f64) -> VehiclePhase {
        self(now)
    }
}

/// One approach of a controlled junction: a controller plus the group that
/// governs this approach.
#[derive(Clone, Debug)]
pub struct SignalLeg {
    pub controller: Arc<TrafficLightController>,
    pub group:      SignalGroup,
}

impl SignalLeg {
    pub fn new(controller: Arc<TrafficLightController>, group: SignalGroup) -> Self {
        Self { controller, group }
    }
}

impl VehicleSignalSource for SignalLeg {
    fn phase(&self, now: f64) -> VehiclePhase {
        self.controller.phase(self.group, now)
    }

    fn is_red_for_vehicles(&self, now: f64) -> bool {
        self.controller.is_vehicles_red(self.group, now)
    }
}
