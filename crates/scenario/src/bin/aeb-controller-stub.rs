//! Stand-in controller for manual runs

use anyhow::Context;
use scenario::controller_stub::{connect, serve};
use scenario::{init_logging, ScenarioConfig, StubPolicy};
use std::time::Duration;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = ScenarioConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging);

    let policy = StubPolicy::default();
    info!("Controller stub policy: {:?}", policy);

    let stream = connect(&config.bridge, 50, Duration::from_millis(200))
        .await
        .with_context(|| format!("No scenario listening on {}", config.bridge.address()))?;
    let answered = serve(stream, &config.bridge, &policy).await?;
    info!("Answered {} samples", answered);
    Ok(())
}
