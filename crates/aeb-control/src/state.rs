//! State carried across ticks

use serde::{Deserialize, Serialize};
use std::fmt;
use telemetry_bridge::ControlResponse;

use crate::TtcTracker;

/// AEB intervention status as displayed and logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AebStatus {
    Active,
    #[default]
    Inactive,
}

impl AebStatus {
    pub fn from_flag(active: bool) -> Self {
        if active {
            AebStatus::Active
        } else {
            AebStatus::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AebStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AebStatus::Active => "ACTIVE",
            AebStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for AebStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Collision flag that, once set, stays set for the rest of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionLatch {
    occurred: bool,
}

impl CollisionLatch {
    /// Latch when `distance <= threshold`. Returns true only on the tick
    /// that sets the latch.
    pub fn observe(&mut self, distance: f64, threshold: f64) -> bool {
        if distance <= threshold && !self.occurred {
            self.occurred = true;
            return true;
        }
        false
    }

    pub fn occurred(&self) -> bool {
        self.occurred
    }
}

/// Controller-facing state kept between ticks
#[derive(Debug, Clone, Default)]
pub struct ControlState {
    pub ttc: TtcTracker,
    pub collision: CollisionLatch,
    pub aeb_status: AebStatus,
    pub fcw_active: bool,
    pub ego_stop: bool,
    pub deceleration: f64,
}

impl ControlState {
    /// Take over the controller's latest answer. Without one, every field
    /// keeps its previous value.
    pub fn apply_response(&mut self, response: Option<ControlResponse>) -> bool {
        match response {
            Some(r) => {
                self.ego_stop = r.ego_stop;
                self.fcw_active = r.fcw_active;
                self.deceleration = r.deceleration;
                self.aeb_status = AebStatus::from_flag(r.aeb_active);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_is_monotonic() {
        let mut latch = CollisionLatch::default();
        assert!(!latch.observe(10.0, 2.0));
        assert!(latch.observe(2.0, 2.0));
        assert!(!latch.observe(1.0, 2.0));
        for d in [5.0, 50.0, 1000.0] {
            latch.observe(d, 2.0);
            assert!(latch.occurred());
        }
    }

    #[test]
    fn test_missing_response_keeps_state() {
        let mut state = ControlState::default();
        state.apply_response(Some(ControlResponse {
            ego_stop: false,
            fcw_active: true,
            deceleration: 0.4,
            aeb_active: true,
        }));

        assert!(!state.apply_response(None));
        assert!(state.fcw_active);
        assert_eq!(state.deceleration, 0.4);
        assert_eq!(state.aeb_status, AebStatus::Active);
    }
}
