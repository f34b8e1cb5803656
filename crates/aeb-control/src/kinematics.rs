//! Closing kinematics and time to collision

use serde::{Deserialize, Serialize};
use sim_world::{ActorId, SimError, Simulator};
use telemetry_bridge::TelemetrySample;

/// Per-tick kinematic state of the ego/lead pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurement {
    /// Ego speed (m/s)
    pub ego_speed: f64,
    /// Lead speed (m/s)
    pub front_speed: f64,
    /// Distance between the two vehicles (m)
    pub distance: f64,
}

impl Measurement {
    /// Read speeds and distance from the simulator
    pub fn read<S: Simulator + ?Sized>(
        sim: &S,
        ego: ActorId,
        lead: ActorId,
    ) -> Result<Self, SimError> {
        Ok(Self {
            ego_speed: sim_world::speed(sim, ego)?,
            front_speed: sim_world::speed(sim, lead)?,
            distance: sim_world::distance(sim, ego, lead)?,
        })
    }

    /// Closing speed, positive when the ego is catching up (m/s)
    pub fn relative_speed(&self) -> f64 {
        self.ego_speed - self.front_speed
    }

    /// Raw time to collision for this tick
    pub fn time_to_collision(&self) -> f64 {
        time_to_collision(self.distance, self.relative_speed())
    }

    /// Telemetry record for the controller
    pub fn sample(&self) -> TelemetrySample {
        TelemetrySample::new(self.distance, self.front_speed, self.ego_speed)
    }
}

/// `distance / relative_speed` while closing, infinite otherwise
pub fn time_to_collision(distance: f64, relative_speed: f64) -> f64 {
    if relative_speed > 0.0 {
        distance / relative_speed
    } else {
        f64::INFINITY
    }
}

/// Holds the last finite TTC so the displayed value never snaps back to
/// infinity once the vehicles have started closing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtcTracker {
    held: f64,
}

impl TtcTracker {
    pub fn new() -> Self {
        Self {
            held: f64::INFINITY,
        }
    }

    /// Feed a raw TTC, returning the value to display
    pub fn update(&mut self, raw: f64) -> f64 {
        if raw.is_finite() {
            self.held = raw;
        }
        self.held
    }

    /// Value to display (infinite until a finite TTC has been seen)
    pub fn value(&self) -> f64 {
        self.held
    }
}

impl Default for TtcTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ttc_when_closing() {
        assert_eq!(time_to_collision(40.0, 10.0), 4.0);
    }

    #[test]
    fn test_ttc_infinite_when_not_closing() {
        assert!(time_to_collision(40.0, 0.0).is_infinite());
        assert!(time_to_collision(40.0, -3.0).is_infinite());
    }

    #[test]
    fn test_tracker_holds_last_finite() {
        let mut tracker = TtcTracker::new();
        assert!(tracker.update(f64::INFINITY).is_infinite());
        assert_eq!(tracker.update(3.5), 3.5);
        assert_eq!(tracker.update(f64::INFINITY), 3.5);
        assert_eq!(tracker.update(1.25), 1.25);
        assert_eq!(tracker.value(), 1.25);
    }

    #[test]
    fn test_measurement_sample_order() {
        let m = Measurement {
            ego_speed: 12.0,
            front_speed: 2.0,
            distance: 30.0,
        };
        assert_eq!(m.sample().fields(), [30.0, 2.0, 12.0]);
        assert_eq!(m.time_to_collision(), 3.0);
    }

    proptest! {
        #[test]
        fn ttc_is_exact_quotient(distance in 0.0f64..500.0, relative in 1e-3f64..80.0) {
            prop_assert_eq!(time_to_collision(distance, relative), distance / relative);
        }

        #[test]
        fn receding_keeps_previous(prev in 0.0f64..100.0, relative in -80.0f64..=0.0, distance in 0.0f64..500.0) {
            let mut tracker = TtcTracker::new();
            tracker.update(prev);
            prop_assert_eq!(tracker.update(time_to_collision(distance, relative)), prev);
        }
    }
}
