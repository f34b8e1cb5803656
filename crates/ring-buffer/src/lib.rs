//! Rolling Windows
//!
//! Bounded FIFO buffers for the metrics plotted during a scenario run.

mod buffer;
mod metrics;

pub use buffer::RollingWindow;
pub use metrics::{MetricSample, MetricWindows};

/// Default window capacity (500 samples = 25 s at 20 Hz)
pub const DEFAULT_CAPACITY: usize = 500;
