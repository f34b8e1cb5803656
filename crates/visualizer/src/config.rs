//! Visualizer configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Chart and export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Directory receiving the exported charts
    pub output_dir: PathBuf,
    /// File name stem, followed by `_YYYYMMDD_HHMMSS`
    pub file_prefix: String,
    /// Samples retained per metric
    pub capacity: usize,
    /// Redraw after this many appends
    pub redraw_every: usize,
    /// Width of the visible time window (seconds)
    pub window_secs: f64,
    /// TTC ceiling applied to plotted values only (seconds)
    pub ttc_ceiling: f64,
    /// Export resolution
    pub dpi: u32,
    /// Figure size (inches)
    pub figure_width_in: f64,
    pub figure_height_in: f64,
    /// Optional PNG refreshed on every redraw
    pub live_preview: Option<PathBuf>,
    /// Resolution of the live preview
    pub live_preview_dpi: u32,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("figures"),
            file_prefix: "aeb_scenario1_plots".to_string(),
            capacity: ring_buffer::DEFAULT_CAPACITY,
            redraw_every: 5,
            window_secs: 30.0,
            ttc_ceiling: 10.0,
            dpi: 300,
            figure_width_in: 14.0,
            figure_height_in: 12.0,
            live_preview: None,
            live_preview_dpi: 72,
        }
    }
}

impl VisualizerConfig {
    /// Pixel size of the figure at a given resolution
    pub fn figure_pixels(&self, dpi: u32) -> (u32, u32) {
        (
            (self.figure_width_in * dpi as f64).round().max(1.0) as u32,
            (self.figure_height_in * dpi as f64).round().max(1.0) as u32,
        )
    }
}
