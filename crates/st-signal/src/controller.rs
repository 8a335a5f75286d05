//! Two-group fixed-time signal controller.

use crate::{PhaseTimings, SignalGroup, SignalResult, VehiclePhase};

/// A fixed-time junction controller serving groups A then B.
///
/// The cycle runs GreenA → YellowA → AllRedA → GreenB → YellowB → AllRedB.
/// During A's intervals B is red and vice versa; both all-red intervals are
/// red for both groups.
///
/// The controller is immutable after construction.  Share it with
/// `Arc<TrafficLightController>` between [`SignalLeg`](crate::SignalLeg)s.
#[derive(Clone, Debug)]
pub struct TrafficLightController {
    timings: PhaseTimings,
    cycle:   f64,
    /// Simulation time at which the cycle was at `u = 0`.
    epoch:   f64,
}

impl TrafficLightController {
    /// Build a controller that starts its cycle at `start_time`.
    ///
    /// A positive `start_offset_secs` makes the junction behave as though it
    /// had already been running that long; negative offsets are ignored.
    ///
    /// # Errors
    ///
    /// [`SignalError::BadDuration`](crate::SignalError::BadDuration) if any
    /// interval is negative or non-finite.
    pub fn new(timings: PhaseTimings, start_time: f64, start_offset_secs: f64) -> SignalResult<Self> {
        timings.validate()?;
        let cycle = f64::from(timings.cycle_length());
        Ok(Self {
            timings,
            cycle,
            epoch: start_time - start_offset_secs.max(0.0),
        })
    }

    #[inline]
    pub fn cycle_length(&self) -> f64 {
        self.cycle
    }

    #[inline]
    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    /// Position inside the current cycle, in `[0, cycle_length)`.
    ///
    /// Times before the epoch wrap backwards into the previous cycle.
    pub fn time_in_cycle(&self, now: f64) -> f64 {
        let u = (now - self.epoch).rem_euclid(self.cycle);
        // rem_euclid can round up to exactly `cycle` for tiny negative inputs.
        if u >= self.cycle { 0.0 } else { u }
    }

    /// The phase `group` shows to vehicles at `now`.
    pub fn phase(&self, group: SignalGroup, now: f64) -> VehiclePhase {
        let t = &self.timings;
        let mut u = self.time_in_cycle(now);

        let served = |g: SignalGroup, lit: VehiclePhase| {
            if group == g { lit } else { VehiclePhase::Red }
        };

        let intervals = [
            (f64::from(t.green_a), served(SignalGroup::A, VehiclePhase::Green)),
            (f64::from(t.yellow_a), served(SignalGroup::A, VehiclePhase::Yellow)),
            (f64::from(t.all_red_a), VehiclePhase::Red),
            (f64::from(t.green_b), served(SignalGroup::B, VehiclePhase::Green)),
            (f64::from(t.yellow_b), served(SignalGroup::B, VehiclePhase::Yellow)),
        ];
        for (len, phase) in intervals {
            if u < len {
                return phase;
            }
            u -= len;
        }
        VehiclePhase::Red
    }

    /// `true` only for `Red`.  Yellow still belongs to vehicles, so
    /// pedestrians on a signalised crossing wait for full red.
    #[inline]
    pub fn is_vehicles_red(&self, group: SignalGroup, now: f64) -> bool {
        self.phase(group, now) == VehiclePhase::Red
    }
}
