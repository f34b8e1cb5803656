//! Vehicle command law

use sim_world::VehicleControl;

use crate::ControlConfig;

/// Ego command when neither a stop request nor a collision overrides it.
///
/// Throttle falls off linearly with the commanded deceleration but never
/// below the floor, so throttle and brake can both be non-zero.
pub fn modulated_command(deceleration: f64, config: &ControlConfig) -> VehicleControl {
    VehicleControl::new(
        config.throttle_floor.max(config.base_throttle - deceleration),
        deceleration,
    )
}

/// Lead vehicle command: it brakes continuously as a stationary target
pub fn lead_command() -> VehicleControl {
    VehicleControl::full_brake()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderate_deceleration_overlaps_throttle() {
        let control = modulated_command(0.2, &ControlConfig::default());
        assert_eq!(control.throttle, 0.3);
        assert_eq!(control.brake, 0.2);
    }

    #[test]
    fn test_no_deceleration() {
        let control = modulated_command(0.0, &ControlConfig::default());
        assert_eq!(control.throttle, 0.5);
        assert_eq!(control.brake, 0.0);
    }

    #[test]
    fn test_throttle_floor() {
        let control = modulated_command(1.0, &ControlConfig::default());
        assert_eq!(control.throttle, 0.3);
        assert_eq!(control.brake, 1.0);
    }
}
