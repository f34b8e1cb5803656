//! Scenario metric windows
//!
//! Six parallel windows (time, distance, TTC, ego speed, front speed, AEB
//! flag). Samples only enter through [`MetricWindows::push`], which appends
//! to all six at once, so the windows always have equal length.

use serde::{Deserialize, Serialize};

use crate::RollingWindow;

/// One row of plotted metrics, already in display units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSample {
    /// Seconds since logging started
    pub time: f64,
    /// Ego to lead distance (m)
    pub distance: f64,
    /// Time to collision (s), clamped for display
    pub ttc: f64,
    /// Ego speed (km/h)
    pub ego_speed: f64,
    /// Lead speed (km/h)
    pub front_speed: f64,
    /// 1.0 while AEB is active, else 0.0
    pub aeb: f64,
}

/// Parallel rolling windows for every plotted metric
#[derive(Debug, Clone)]
pub struct MetricWindows {
    time: RollingWindow<f64>,
    distance: RollingWindow<f64>,
    ttc: RollingWindow<f64>,
    ego_speed: RollingWindow<f64>,
    front_speed: RollingWindow<f64>,
    aeb: RollingWindow<f64>,
}

impl MetricWindows {
    pub fn new(capacity: usize) -> Self {
        Self {
            time: RollingWindow::new(capacity),
            distance: RollingWindow::new(capacity),
            ttc: RollingWindow::new(capacity),
            ego_speed: RollingWindow::new(capacity),
            front_speed: RollingWindow::new(capacity),
            aeb: RollingWindow::new(capacity),
        }
    }

    /// Append one sample to every window
    pub fn push(&mut self, sample: MetricSample) {
        self.time.push(sample.time);
        self.distance.push(sample.distance);
        self.ttc.push(sample.ttc);
        self.ego_speed.push(sample.ego_speed);
        self.front_speed.push(sample.front_speed);
        self.aeb.push(sample.aeb);
    }

    /// Number of retained samples (identical for every metric)
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.time.capacity()
    }

    /// Lengths of the six windows, in field order
    pub fn lengths(&self) -> [usize; 6] {
        [
            self.time.len(),
            self.distance.len(),
            self.ttc.len(),
            self.ego_speed.len(),
            self.front_speed.len(),
            self.aeb.len(),
        ]
    }

    /// Latest sample time
    pub fn latest_time(&self) -> Option<f64> {
        self.time.back().copied()
    }

    /// Retained samples, oldest first
    pub fn samples(&self) -> Vec<MetricSample> {
        self.time
            .iter()
            .zip(self.distance.iter())
            .zip(self.ttc.iter())
            .zip(self.ego_speed.iter())
            .zip(self.front_speed.iter())
            .zip(self.aeb.iter())
            .map(
                |(((((&time, &distance), &ttc), &ego_speed), &front_speed), &aeb)| MetricSample {
                    time,
                    distance,
                    ttc,
                    ego_speed,
                    front_speed,
                    aeb,
                },
            )
            .collect()
    }

    pub fn time(&self) -> &RollingWindow<f64> {
        &self.time
    }

    pub fn distance(&self) -> &RollingWindow<f64> {
        &self.distance
    }

    pub fn ttc(&self) -> &RollingWindow<f64> {
        &self.ttc
    }

    pub fn ego_speed(&self) -> &RollingWindow<f64> {
        &self.ego_speed
    }

    pub fn front_speed(&self) -> &RollingWindow<f64> {
        &self.front_speed
    }

    pub fn aeb(&self) -> &RollingWindow<f64> {
        &self.aeb
    }
}

impl Default for MetricWindows {
    fn default() -> Self {
        Self::new(crate::DEFAULT_CAPACITY)
    }
}
