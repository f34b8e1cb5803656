//! AEB Scenario Control
//!
//! Per-tick logic of the car-to-car AEB scenario. Perception and braking
//! decisions come from the external controller; this crate turns the
//! simulator state into telemetry, folds the controller's answers into the
//! carried state, and derives the vehicle commands.

pub mod command;
pub mod config;
pub mod kinematics;
pub mod object;
pub mod state;

pub use command::{lead_command, modulated_command};
pub use config::ControlConfig;
pub use kinematics::{time_to_collision, Measurement, TtcTracker};
pub use object::ObstacleType;
pub use state::{AebStatus, CollisionLatch, ControlState};

use sim_world::VehicleControl;
use telemetry_bridge::ControlResponse;
use tracing::{debug, warn};

/// TTC values after one observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TtcReading {
    /// This tick's raw value (may be infinite)
    pub raw: f64,
    /// Value to display and log
    pub held: f64,
}

/// Scenario controller state machine
pub struct AebController {
    config: ControlConfig,
    state: ControlState,
}

impl AebController {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            config,
            state: ControlState::default(),
        }
    }

    /// Fold a new measurement into the TTC tracker
    pub fn observe(&mut self, measurement: &Measurement) -> TtcReading {
        let raw = measurement.time_to_collision();
        let held = self.state.ttc.update(raw);
        TtcReading { raw, held }
    }

    /// Apply the controller's answer for this tick, if any
    pub fn apply_response(&mut self, response: Option<ControlResponse>) -> bool {
        let applied = self.state.apply_response(response);
        if !applied {
            debug!("No controller response this tick, keeping previous commands");
        }
        applied
    }

    /// Command for the ego vehicle.
    ///
    /// A stop request or a recorded collision forces a full stop and shows
    /// AEB as active whatever the controller reported.
    pub fn ego_command(&mut self) -> VehicleControl {
        if self.state.ego_stop || self.state.collision.occurred() {
            self.state.aeb_status = AebStatus::Active;
            VehicleControl::full_brake()
        } else {
            modulated_command(self.state.deceleration, &self.config)
        }
    }

    /// Command for the lead vehicle
    pub fn lead_command(&self) -> VehicleControl {
        lead_command()
    }

    /// Record a collision when the gap closes. Returns true on the tick the
    /// collision is first detected.
    pub fn check_collision(&mut self, distance: f64) -> bool {
        let latched = self
            .state
            .collision
            .observe(distance, self.config.collision_distance_m);
        if latched {
            warn!(
                "[COLLISION DETECTED] Distance: {:.1}m | TTC: {:.2}s",
                distance,
                self.state.ttc.value()
            );
        }
        latched
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }
}

impl Default for AebController {
    fn default() -> Self {
        Self::new(ControlConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closing(distance: f64) -> Measurement {
        Measurement {
            ego_speed: 10.0,
            front_speed: 0.0,
            distance,
        }
    }

    #[test]
    fn test_ttc_reading_held() {
        let mut controller = AebController::default();
        let reading = controller.observe(&closing(20.0));
        assert_eq!(reading.held, 2.0);

        let stopped = Measurement {
            ego_speed: 0.0,
            front_speed: 0.0,
            distance: 5.0,
        };
        let reading = controller.observe(&stopped);
        assert!(reading.raw.is_infinite());
        assert_eq!(reading.held, 2.0);
    }

    #[test]
    fn test_ego_stop_overrides_controller_status() {
        let mut controller = AebController::default();
        controller.apply_response(Some(ControlResponse {
            ego_stop: true,
            fcw_active: false,
            deceleration: 0.1,
            aeb_active: false,
        }));

        let control = controller.ego_command();
        assert_eq!(control, VehicleControl::full_brake());
        assert_eq!(controller.state().aeb_status, AebStatus::Active);
    }

    #[test]
    fn test_collision_forces_stop() {
        let mut controller = AebController::default();
        assert!(controller.check_collision(1.5));
        assert!(!controller.check_collision(1.0));

        controller.apply_response(Some(ControlResponse::default()));
        assert_eq!(controller.ego_command(), VehicleControl::full_brake());
        assert!(controller.state().aeb_status.is_active());
    }

    #[test]
    fn test_modulated_command_without_flags() {
        let mut controller = AebController::default();
        controller.apply_response(Some(ControlResponse {
            deceleration: 0.2,
            ..Default::default()
        }));
        let control = controller.ego_command();
        assert_eq!(control.throttle, 0.3);
        assert_eq!(control.brake, 0.2);
        assert_eq!(controller.state().aeb_status, AebStatus::Inactive);
    }

    #[test]
    fn test_lead_always_brakes() {
        let controller = AebController::default();
        assert_eq!(controller.lead_command(), VehicleControl::full_brake());
    }
}
