//! AEB Scenario 1 - Main Entry Point

use anyhow::Context;
use scenario::{init_logging, Scenario, ScenarioConfig};
use sim_world::KinematicWorld;
use telemetry_bridge::BridgeListener;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = ScenarioConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging);

    info!("=== AEB SCENARIO 1 v{} ===", env!("CARGO_PKG_VERSION"));

    let mut scenario = Scenario::new(config.clone(), KinematicWorld::new());
    scenario.start().context("Scenario setup failed")?;

    let listener = BridgeListener::bind(config.bridge.clone())
        .await
        .context("Failed to open controller port")?;

    let reason = scenario.run(listener).await?;
    info!("Done ({:?})", reason);
    Ok(())
}
