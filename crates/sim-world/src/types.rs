//! Simulator value types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};

/// Actor handle issued by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 3D vector (location in meters or velocity in m/s)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Vector3) -> f64 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z).norm()
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotation {
    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Unit vector pointing along the heading (pitch and yaw)
    pub fn forward(&self) -> Vector3 {
        let pitch = self.pitch.to_radians();
        let yaw = self.yaw.to_radians();
        Vector3::new(pitch.cos() * yaw.cos(), pitch.cos() * yaw.sin(), pitch.sin())
    }
}

/// Location plus rotation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub location: Vector3,
    pub rotation: Rotation,
}

impl Transform {
    pub fn new(location: Vector3, rotation: Rotation) -> Self {
        Self { location, rotation }
    }

    /// Map a point from actor-local coordinates to world coordinates
    pub fn transform_point(&self, local: Vector3) -> Vector3 {
        let yaw = self.rotation.yaw.to_radians();
        let (sin, cos) = yaw.sin_cos();
        let rotated = Vector3::new(
            local.x * cos - local.y * sin,
            local.x * sin + local.y * cos,
            local.z,
        );
        self.location + rotated
    }
}

/// Throttle/brake command, both in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleControl {
    pub throttle: f64,
    pub brake: f64,
}

impl VehicleControl {
    pub fn new(throttle: f64, brake: f64) -> Self {
        Self { throttle, brake }
    }

    /// Zero throttle, maximum brake
    pub fn full_brake() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// RGB debug-draw color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const ORANGE: Color = Color { r: 255, g: 165, b: 0 };
}

/// Weather parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherParameters {
    pub cloudiness: f64,
    pub precipitation: f64,
    pub sun_altitude_angle: f64,
    pub fog_density: f64,
}

impl WeatherParameters {
    /// Clear, dry, high sun
    pub fn clear_noon() -> Self {
        Self {
            cloudiness: 0.0,
            precipitation: 0.0,
            sun_altitude_angle: 70.0,
            fog_density: 0.0,
        }
    }
}

impl Default for WeatherParameters {
    fn default() -> Self {
        Self::clear_noon()
    }
}

/// World stepping settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Only advance when the client ticks
    pub synchronous_mode: bool,
    /// Simulated seconds per tick
    pub fixed_delta_seconds: f64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            synchronous_mode: true,
            fixed_delta_seconds: 0.05,
        }
    }
}
