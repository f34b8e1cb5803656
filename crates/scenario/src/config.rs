//! Scenario configuration
//!
//! Built-in defaults, then an optional TOML file (`aeb-scenario.toml`, or
//! the path in `AEB_CONFIG`), then `AEB__SECTION__KEY` environment
//! variables.

use aeb_control::ControlConfig;
use config::{Config, Environment, File};
use hud::HudConfig;
use serde::{Deserialize, Serialize};
use sim_world::{Rotation, Transform, Vector3, WeatherParameters, WorldSettings};
use telemetry_bridge::BridgeConfig;
use visualizer::VisualizerConfig;

use crate::ScenarioError;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "AEB_CONFIG";

/// Default config file stem (any extension `config` understands)
pub const DEFAULT_CONFIG_FILE: &str = "aeb-scenario";

/// Where and what to spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub blueprint: String,
    pub transform: Transform,
}

impl SpawnPoint {
    fn at(blueprint: &str, x: f64, y: f64, z: f64) -> Self {
        Self {
            blueprint: blueprint.to_string(),
            transform: Transform::new(Vector3::new(x, y, z), Rotation::default()),
        }
    }
}

/// Simulator session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Map to load
    pub town: String,
    pub world: WorldSettings,
    pub weather: WeatherParameters,
    pub ego: SpawnPoint,
    pub lead: SpawnPoint,
    /// Wall-clock pacing of the loop, `None` runs as fast as possible
    pub frame_rate_hz: Option<f64>,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Spectator camera offset from the ego location (m)
    pub spectator_offset: Vector3,
    pub spectator_rotation: Rotation,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            town: "Town03".to_string(),
            world: WorldSettings::default(),
            weather: WeatherParameters::clear_noon(),
            ego: SpawnPoint::at("vehicle.audi.tt", 80.206383, 7.808423, 0.275307),
            lead: SpawnPoint::at("vehicle.tesla.model3", 126.206383, 7.808423, 0.275307),
            frame_rate_hz: Some(20.0),
            max_ticks: None,
            spectator_offset: Vector3::new(5.0, -10.0, 2.0),
            spectator_rotation: Rotation::new(0.0, 90.0, 0.0),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete runner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub bridge: BridgeConfig,
    pub simulation: SimulationConfig,
    pub control: ControlConfig,
    pub visualizer: VisualizerConfig,
    pub hud: HudConfig,
    pub logging: LoggingConfig,
}

impl ScenarioConfig {
    /// Load from the default file location and the process environment
    pub fn load() -> Result<Self, ScenarioError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::build(Some(&path), env_source())
    }

    /// Layer defaults, an optional file and the given environment source
    pub fn build(file: Option<&str>, env: Environment) -> Result<Self, ScenarioError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = file {
            builder = builder.add_source(File::with_name(path).required(false));
        }
        Ok(builder.add_source(env).build()?.try_deserialize()?)
    }
}

/// `AEB__BRIDGE__PORT=9100` style overrides
pub fn env_source() -> Environment {
    Environment::with_prefix("AEB")
        .separator("__")
        .try_parsing(true)
}
