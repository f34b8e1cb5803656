//! Scenario Visualizer
//!
//! Keeps the last few hundred samples of the scenario metrics, maintains a
//! four-panel chart over a sliding time window, and writes the final chart
//! as PNG and SVG when the run ends.

mod chart;
mod config;
mod logger;

pub use chart::{
    draw_figure, draw_unlabelled, render_png, render_svg, ChartView, Panel, PanelSeries,
    Threshold,
};
pub use config::VisualizerConfig;
pub use logger::DataLogger;

use thiserror::Error;

/// Visualizer errors
#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error("Output directory error: {0}")]
    OutputDir(String),
    #[error("Render error: {0}")]
    Render(String),
}
