//! AEB Scenario Runner
//!
//! Car-to-car AEB test scenario: an ego vehicle approaches a braked lead
//! vehicle while an external controller, reached over the telemetry
//! bridge, decides when to warn and brake.

pub mod config;
pub mod controller_stub;
pub mod logging;
pub mod runner;

pub use config::{LoggingConfig, ScenarioConfig, SimulationConfig, SpawnPoint};
pub use controller_stub::StubPolicy;
pub use logging::init_logging;
pub use runner::{Scenario, StopReason, TickReport, Vehicles};

use sim_world::SimError;
use telemetry_bridge::BridgeError;
use thiserror::Error;

/// Scenario errors
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Simulator error: {0}")]
    Sim(#[from] SimError),

    #[error("Controller link error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Scenario not started")]
    NotStarted,
}
