//! Controller Link
//!
//! Accepts exactly one controller connection and exchanges one record in
//! each direction per tick. Reads are bounded by a short timeout so a slow
//! or absent controller cannot stall the simulation tick.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::codec::{ByteOrder, ControlResponse, TelemetrySample};
use crate::error::BridgeError;
use crate::wire::{DEFAULT_PORT, FIELD_LEN, RESPONSE_LEN};

/// Controller link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listen host
    pub host: String,
    /// Listen port (0 picks a free port)
    pub port: u16,
    /// Timeout applied to every read (milliseconds)
    pub read_timeout_ms: u64,
    /// Pause before retrying after a short read (milliseconds)
    pub retry_sleep_ms: u64,
    /// Short reads tolerated within one response before giving up
    pub max_short_read_retries: u32,
    /// Field byte order
    pub byte_order: ByteOrder,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            read_timeout_ms: 100,
            retry_sleep_ms: 10,
            max_short_read_retries: 50,
            byte_order: ByteOrder::Little,
        }
    }
}

impl BridgeConfig {
    /// `host:port` string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Listening socket waiting for the controller
pub struct BridgeListener {
    listener: TcpListener,
    config: BridgeConfig,
}

impl BridgeListener {
    /// Bind the listening socket (address reuse on, backlog of one)
    pub async fn bind(config: BridgeConfig) -> Result<Self, BridgeError> {
        let addr_str = config.address();
        let bind_err = |reason: String| BridgeError::Bind {
            addr: addr_str.clone(),
            reason,
        };

        let addr = tokio::net::lookup_host(&addr_str)
            .await
            .map_err(|e| bind_err(e.to_string()))?
            .next()
            .ok_or_else(|| bind_err("address did not resolve".to_string()))?;

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(|e| bind_err(e.to_string()))?;
        socket
            .set_reuseaddr(true)
            .map_err(|e| bind_err(e.to_string()))?;
        socket.bind(addr).map_err(|e| bind_err(e.to_string()))?;
        let listener = socket.listen(1).map_err(|e| bind_err(e.to_string()))?;

        info!(
            "Waiting for controller connection on {}",
            listener.local_addr().map(|a| a.to_string()).unwrap_or(addr_str)
        );
        Ok(Self { listener, config })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> Result<SocketAddr, BridgeError> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait for the controller and take its connection
    pub async fn accept(self) -> Result<TelemetryBridge, BridgeError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(|e| BridgeError::Accept(e.to_string()))?;
        stream.set_nodelay(true)?;
        info!("Controller connected from {}", peer);
        Ok(TelemetryBridge::new(stream, peer, self.config))
    }
}

/// Established link to the controller
pub struct TelemetryBridge {
    stream: Option<TcpStream>,
    peer: SocketAddr,
    config: BridgeConfig,
    /// Bytes of a response interrupted by a timeout, kept so the stream
    /// stays aligned on record boundaries
    pending: Vec<u8>,
    samples_sent: u64,
    responses_received: u64,
}

impl TelemetryBridge {
    fn new(stream: TcpStream, peer: SocketAddr, config: BridgeConfig) -> Self {
        Self {
            stream: Some(stream),
            peer,
            config,
            pending: Vec::with_capacity(RESPONSE_LEN),
            samples_sent: 0,
            responses_received: 0,
        }
    }

    /// Bind, then block until exactly one controller connects
    pub async fn listen(config: BridgeConfig) -> Result<Self, BridgeError> {
        BridgeListener::bind(config).await?.accept().await
    }

    /// Send one telemetry sample
    pub async fn send_sample(&mut self, sample: &TelemetrySample) -> Result<(), BridgeError> {
        let bytes = sample.encode(self.config.byte_order);
        let stream = self.stream.as_mut().ok_or(BridgeError::NotConnected)?;

        if let Err(e) = stream.write_all(&bytes).await {
            error!("Telemetry send failed: {}", e);
            return Err(e.into());
        }
        self.samples_sent += 1;
        debug!(
            distance = sample.distance,
            front = sample.front_velocity,
            ego = sample.ego_velocity,
            "Telemetry sent"
        );
        Ok(())
    }

    /// Receive one control response.
    ///
    /// Returns `Ok(None)` when the controller has not answered within the
    /// read timeout or the read failed transiently; the caller keeps its
    /// previous state. A closed or reset connection is an error.
    /// A response is only returned once all four fields are in.
    pub async fn receive_response(&mut self) -> Result<Option<ControlResponse>, BridgeError> {
        let read_timeout = Duration::from_millis(self.config.read_timeout_ms);
        let retry_sleep = Duration::from_millis(self.config.retry_sleep_ms);
        let max_retries = self.config.max_short_read_retries;
        let order = self.config.byte_order;

        let stream = self.stream.as_mut().ok_or(BridgeError::NotConnected)?;
        let mut retries = 0u32;

        while self.pending.len() < RESPONSE_LEN {
            let field_end = (self.pending.len() / FIELD_LEN + 1) * FIELD_LEN;
            let want = field_end - self.pending.len();
            let mut chunk = [0u8; FIELD_LEN];

            match timeout(read_timeout, stream.read(&mut chunk[..want])).await {
                Err(_) => {
                    debug!(
                        "Timeout waiting for controller response ({} bytes buffered)",
                        self.pending.len()
                    );
                    return Ok(None);
                }
                Ok(Ok(0)) => {
                    warn!("Controller closed the connection");
                    return Err(BridgeError::ConnectionClosed);
                }
                Ok(Ok(n)) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    if n < want {
                        retries += 1;
                        if retries > max_retries {
                            let received = self.pending.len();
                            self.pending.clear();
                            error!(
                                "Incomplete response after {} short reads ({} bytes)",
                                max_retries, received
                            );
                            return Err(BridgeError::IncompleteFrame {
                                received,
                                expected: RESPONSE_LEN,
                                retries: max_retries,
                            });
                        }
                        debug!("Incomplete field ({} of {} bytes), retrying", n, want);
                        sleep(retry_sleep).await;
                    }
                }
                Ok(Err(e)) => {
                    let err = BridgeError::from(e);
                    if err.is_fatal() {
                        warn!("Controller link lost: {}", err);
                        return Err(err);
                    }
                    warn!("Receive error: {}", err);
                    return Ok(None);
                }
            }
        }

        let mut frame = [0u8; RESPONSE_LEN];
        frame.copy_from_slice(&self.pending[..RESPONSE_LEN]);
        self.pending.clear();

        let response = ControlResponse::decode(&frame, order);
        self.responses_received += 1;
        debug!(?response, "Controller response received");
        Ok(Some(response))
    }

    /// Close the connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            info!(
                "Closing controller link to {} ({} samples sent, {} responses received)",
                self.peer, self.samples_sent, self.responses_received
            );
        }
    }

    /// Whether the link is still open
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Controller address
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Samples sent so far
    pub fn samples_sent(&self) -> u64 {
        self.samples_sent
    }

    /// Complete responses received so far
    pub fn responses_received(&self) -> u64 {
        self.responses_received
    }
}
