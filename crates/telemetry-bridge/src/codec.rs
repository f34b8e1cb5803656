//! Wire Schema
//!
//! Both directions are bare sequences of 8-byte IEEE-754 doubles with no
//! framing or length prefix; record boundaries come from the fixed sizes.
//!
//! | Direction           | Bytes | Fields (in order)                                   |
//! |---------------------|-------|-----------------------------------------------------|
//! | bridge → controller | 24    | distance (m), front velocity (m/s), ego velocity (m/s) |
//! | controller → bridge | 32    | ego stop, FCW active, deceleration [0,1], AEB active |
//!
//! Flags travel as doubles and are decoded by rounding to the nearest
//! integer (ties to even) and testing for non-zero.

use serde::{Deserialize, Serialize};

use crate::wire::{FIELD_LEN, RESPONSE_LEN, SAMPLE_LEN};

/// Byte order of every field on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Native order of x86 controller hosts
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// Encode one field
    pub fn encode_f64(self, value: f64) -> [u8; FIELD_LEN] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    /// Decode one field
    pub fn decode_f64(self, bytes: [u8; FIELD_LEN]) -> f64 {
        match self {
            ByteOrder::Little => f64::from_le_bytes(bytes),
            ByteOrder::Big => f64::from_be_bytes(bytes),
        }
    }
}

/// Decode a boolean carried as a double
pub fn decode_flag(value: f64) -> bool {
    !value.is_nan() && value.round_ties_even() != 0.0
}

fn encode_flag(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn field(bytes: &[u8], index: usize) -> [u8; FIELD_LEN] {
    let mut out = [0u8; FIELD_LEN];
    out.copy_from_slice(&bytes[index * FIELD_LEN..(index + 1) * FIELD_LEN]);
    out
}

/// Kinematic record sent to the controller every tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Distance between ego and lead vehicle (m)
    pub distance: f64,
    /// Lead vehicle speed (m/s)
    pub front_velocity: f64,
    /// Ego vehicle speed (m/s)
    pub ego_velocity: f64,
}

impl TelemetrySample {
    pub fn new(distance: f64, front_velocity: f64, ego_velocity: f64) -> Self {
        Self {
            distance,
            front_velocity,
            ego_velocity,
        }
    }

    /// Fields in wire order
    pub fn fields(&self) -> [f64; 3] {
        [self.distance, self.front_velocity, self.ego_velocity]
    }

    /// Serialize to the 24-byte wire record
    pub fn encode(&self, order: ByteOrder) -> [u8; SAMPLE_LEN] {
        let mut out = [0u8; SAMPLE_LEN];
        for (i, value) in self.fields().iter().enumerate() {
            out[i * FIELD_LEN..(i + 1) * FIELD_LEN].copy_from_slice(&order.encode_f64(*value));
        }
        out
    }

    /// Parse a 24-byte wire record
    pub fn decode(bytes: &[u8; SAMPLE_LEN], order: ByteOrder) -> Self {
        Self {
            distance: order.decode_f64(field(bytes, 0)),
            front_velocity: order.decode_f64(field(bytes, 1)),
            ego_velocity: order.decode_f64(field(bytes, 2)),
        }
    }
}

/// Command record returned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Controller requests a full stop of the ego vehicle
    pub ego_stop: bool,
    /// Forward collision warning raised
    pub fcw_active: bool,
    /// Commanded deceleration, [0, 1] by convention
    pub deceleration: f64,
    /// Controller reports AEB intervention
    pub aeb_active: bool,
}

impl ControlResponse {
    /// Build from the four raw wire values
    pub fn from_fields(fields: [f64; 4]) -> Self {
        Self {
            ego_stop: decode_flag(fields[0]),
            fcw_active: decode_flag(fields[1]),
            deceleration: fields[2],
            aeb_active: decode_flag(fields[3]),
        }
    }

    /// Fields in wire order, flags as 0.0/1.0
    pub fn fields(&self) -> [f64; 4] {
        [
            encode_flag(self.ego_stop),
            encode_flag(self.fcw_active),
            self.deceleration,
            encode_flag(self.aeb_active),
        ]
    }

    /// Parse a 32-byte wire record
    pub fn decode(bytes: &[u8; RESPONSE_LEN], order: ByteOrder) -> Self {
        let mut fields = [0.0; 4];
        for (i, value) in fields.iter_mut().enumerate() {
            *value = order.decode_f64(field(bytes, i));
        }
        Self::from_fields(fields)
    }

    /// Serialize to the 32-byte wire record
    pub fn encode(&self, order: ByteOrder) -> [u8; RESPONSE_LEN] {
        let mut out = [0u8; RESPONSE_LEN];
        for (i, value) in self.fields().iter().enumerate() {
            out[i * FIELD_LEN..(i + 1) * FIELD_LEN].copy_from_slice(&order.encode_f64(*value));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn raw_response(values: [f64; 4], order: ByteOrder) -> [u8; RESPONSE_LEN] {
        let mut bytes = [0u8; RESPONSE_LEN];
        for (i, v) in values.iter().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&order.encode_f64(*v));
        }
        bytes
    }

    #[test]
    fn test_response_decode() {
        let bytes = raw_response([1.0, 0.0, 0.35, 1.0], ByteOrder::Little);
        let response = ControlResponse::decode(&bytes, ByteOrder::Little);
        assert_eq!(
            response,
            ControlResponse {
                ego_stop: true,
                fcw_active: false,
                deceleration: 0.35,
                aeb_active: true,
            }
        );
    }

    #[test]
    fn test_sample_layout() {
        let sample = TelemetrySample::new(46.0, 0.0, 12.5);
        let bytes = sample.encode(ByteOrder::Little);
        assert_eq!(&bytes[0..8], &46.0f64.to_le_bytes());
        assert_eq!(&bytes[8..16], &0.0f64.to_le_bytes());
        assert_eq!(&bytes[16..24], &12.5f64.to_le_bytes());

        let bytes = sample.encode(ByteOrder::Big);
        assert_eq!(&bytes[0..8], &46.0f64.to_be_bytes());
    }

    #[test]
    fn test_flag_rounding() {
        assert!(decode_flag(1.0));
        assert!(decode_flag(0.6));
        assert!(decode_flag(-1.0));
        assert!(!decode_flag(0.0));
        assert!(!decode_flag(0.4));
        // Ties round to even
        assert!(!decode_flag(0.5));
        assert!(decode_flag(1.5));
        assert!(!decode_flag(f64::NAN));
    }

    #[test]
    fn test_deceleration_not_clamped() {
        let bytes = raw_response([0.0, 0.0, 1.7, 0.0], ByteOrder::Big);
        let response = ControlResponse::decode(&bytes, ByteOrder::Big);
        assert_eq!(response.deceleration, 1.7);
    }

    proptest! {
        #[test]
        fn sample_round_trip_is_exact(
            distance in 0.0f64..1.0e6,
            front in -100.0f64..100.0,
            ego in -100.0f64..100.0,
            big in any::<bool>(),
        ) {
            let order = if big { ByteOrder::Big } else { ByteOrder::Little };
            let sample = TelemetrySample::new(distance, front, ego);
            let decoded = TelemetrySample::decode(&sample.encode(order), order);
            prop_assert_eq!(decoded.distance.to_bits(), distance.to_bits());
            prop_assert_eq!(decoded.front_velocity.to_bits(), front.to_bits());
            prop_assert_eq!(decoded.ego_velocity.to_bits(), ego.to_bits());
        }
    }
}
