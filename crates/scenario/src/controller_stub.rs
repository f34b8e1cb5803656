//! Stand-in controller
//!
//! Connects to the bridge like the external control system would and
//! answers every sample with a fixed TTC-threshold policy. Useful for runs
//! without the real controller.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use telemetry_bridge::wire::SAMPLE_LEN;
use telemetry_bridge::{BridgeConfig, BridgeError, ControlResponse, TelemetrySample};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// TTC thresholds of the stand-in controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StubPolicy {
    /// Forward collision warning below this TTC (s)
    pub fcw_ttc: f64,
    /// Partial braking below this TTC (s)
    pub brake_ttc: f64,
    /// Full stop below this TTC (s)
    pub stop_ttc: f64,
    /// Full stop below this distance whatever the TTC (m)
    pub stop_distance_m: f64,
    /// Deceleration requested while partially braking
    pub partial_decel: f64,
}

impl Default for StubPolicy {
    fn default() -> Self {
        Self {
            fcw_ttc: 4.0,
            brake_ttc: 2.5,
            stop_ttc: 1.2,
            stop_distance_m: 5.0,
            partial_decel: 0.4,
        }
    }
}

impl StubPolicy {
    /// Decide the response for one sample
    pub fn respond(&self, sample: &TelemetrySample) -> ControlResponse {
        let relative = sample.ego_velocity - sample.front_velocity;
        let ttc = aeb_control::time_to_collision(sample.distance, relative);
        let moving = sample.ego_velocity > 0.0;

        if moving && (ttc < self.stop_ttc || sample.distance < self.stop_distance_m) {
            ControlResponse {
                ego_stop: true,
                fcw_active: true,
                deceleration: 1.0,
                aeb_active: true,
            }
        } else if ttc < self.brake_ttc {
            ControlResponse {
                ego_stop: false,
                fcw_active: true,
                deceleration: self.partial_decel,
                aeb_active: true,
            }
        } else if ttc < self.fcw_ttc {
            ControlResponse {
                fcw_active: true,
                ..Default::default()
            }
        } else {
            ControlResponse::default()
        }
    }
}

/// Connect to the bridge, retrying while the scenario is still starting
pub async fn connect(
    config: &BridgeConfig,
    attempts: u32,
    delay: Duration,
) -> Result<TcpStream, BridgeError> {
    let addr = config.address();
    let mut last_err = None;
    for attempt in 1..=attempts.max(1) {
        match TcpStream::connect(&addr).await {
            Ok(stream) => {
                info!("Connected to scenario at {}", addr);
                return Ok(stream);
            }
            Err(e) => {
                debug!("Connect attempt {} to {} failed: {}", attempt, addr, e);
                last_err = Some(e);
                tokio::time::sleep(delay).await;
            }
        }
    }
    Err(last_err
        .map(BridgeError::from)
        .unwrap_or(BridgeError::NotConnected))
}

/// Serve one scenario run until it disconnects. Returns the number of
/// responses sent.
pub async fn serve(
    mut stream: TcpStream,
    config: &BridgeConfig,
    policy: &StubPolicy,
) -> Result<u64, BridgeError> {
    let order = config.byte_order;
    let mut buf = [0u8; SAMPLE_LEN];
    let mut answered = 0u64;

    loop {
        match stream.read_exact(&mut buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                info!("Scenario closed the link after {} responses", answered);
                return Ok(answered);
            }
            Err(e) => {
                warn!("Read from scenario failed: {}", e);
                return Err(e.into());
            }
        }

        let sample = TelemetrySample::decode(&buf, order);
        let response = policy.respond(&sample);
        debug!(?sample, ?response, "Stub decision");

        if let Err(e) = stream.write_all(&response.encode(order)).await {
            // The scenario may close between our read and write
            info!("Scenario went away: {}", e);
            return Ok(answered);
        }
        answered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_far_away_is_quiet() {
        let policy = StubPolicy::default();
        let response = policy.respond(&TelemetrySample::new(46.0, 0.0, 5.0));
        assert_eq!(response, ControlResponse::default());
    }

    #[test]
    fn test_warning_then_braking_then_stop() {
        let policy = StubPolicy::default();

        let warn = policy.respond(&TelemetrySample::new(30.0, 0.0, 10.0));
        assert!(warn.fcw_active && !warn.aeb_active);

        let brake = policy.respond(&TelemetrySample::new(20.0, 0.0, 10.0));
        assert!(brake.aeb_active && !brake.ego_stop);
        assert_eq!(brake.deceleration, 0.4);

        let stop = policy.respond(&TelemetrySample::new(10.0, 0.0, 10.0));
        assert!(stop.ego_stop);
    }

    #[test]
    fn test_stopped_ego_is_not_forced() {
        let policy = StubPolicy::default();
        let response = policy.respond(&TelemetrySample::new(3.0, 0.0, 0.0));
        assert!(!response.ego_stop);
    }
}
