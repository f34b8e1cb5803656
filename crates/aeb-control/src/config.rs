//! AEB control configuration

use serde::{Deserialize, Serialize};

/// Scenario control parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Distance at or below which a collision is recorded (meters)
    pub collision_distance_m: f64,

    /// Ego throttle when no deceleration is commanded
    pub base_throttle: f64,

    /// Lowest ego throttle while the controller only modulates braking
    pub throttle_floor: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            collision_distance_m: 2.0,
            base_throttle: 0.5,
            throttle_floor: 0.3,
        }
    }
}
