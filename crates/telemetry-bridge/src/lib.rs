//! Telemetry Bridge
//!
//! TCP server that exchanges fixed-width binary records with the external
//! AEB controller: one [`TelemetrySample`] out and one [`ControlResponse`]
//! back per simulation tick.

mod bridge;
mod codec;
mod error;

pub use bridge::{BridgeConfig, BridgeListener, TelemetryBridge};
pub use codec::{decode_flag, ByteOrder, ControlResponse, TelemetrySample};
pub use error::BridgeError;

/// Wire layout constants
pub mod wire {
    /// Width of every field (one IEEE-754 double)
    pub const FIELD_LEN: usize = 8;
    /// Fields per telemetry sample: distance, front velocity, ego velocity
    pub const SAMPLE_FIELDS: usize = 3;
    /// Fields per control response: ego stop, FCW, deceleration, AEB
    pub const RESPONSE_FIELDS: usize = 4;
    /// Bytes per telemetry sample
    pub const SAMPLE_LEN: usize = FIELD_LEN * SAMPLE_FIELDS;
    /// Bytes per control response
    pub const RESPONSE_LEN: usize = FIELD_LEN * RESPONSE_FIELDS;
    /// Default controller port
    pub const DEFAULT_PORT: u16 = 9001;
}
