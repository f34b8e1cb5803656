//! Obstacle classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of the most important object ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleType {
    Vehicle,
    Pedestrian,
    Bicycle,
    Unknown,
}

impl ObstacleType {
    /// Classify from a simulator blueprint id
    pub fn classify(type_id: &str) -> Self {
        if type_id.contains("vehicle") {
            ObstacleType::Vehicle
        } else if type_id.contains("walker") {
            ObstacleType::Pedestrian
        } else if type_id.contains("bicycle") {
            ObstacleType::Bicycle
        } else {
            ObstacleType::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleType::Vehicle => "VEHICLE",
            ObstacleType::Pedestrian => "PEDESTRIAN",
            ObstacleType::Bicycle => "BICYCLE",
            ObstacleType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ObstacleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ObstacleType::classify("vehicle.tesla.model3"), ObstacleType::Vehicle);
        assert_eq!(ObstacleType::classify("walker.pedestrian.0001"), ObstacleType::Pedestrian);
        assert_eq!(ObstacleType::classify("static.bicycle_rack"), ObstacleType::Bicycle);
        assert_eq!(ObstacleType::classify("static.prop.cone"), ObstacleType::Unknown);
    }

    #[test]
    fn test_vehicle_takes_precedence() {
        assert_eq!(ObstacleType::classify("vehicle.bicycle"), ObstacleType::Vehicle);
    }
}
