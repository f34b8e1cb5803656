//! Rolling data logger
//!
//! Collects one sample per tick, keeps the chart view up to date every few
//! appends and writes the final figure when the run ends.

use chrono::Local;
use ring_buffer::{MetricSample, MetricWindows};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::chart::{render_png, render_svg, ChartView};
use crate::{VisualizerConfig, VisualizerError};

const MPS_TO_KMH: f64 = 3.6;

/// Rolling metric logger backing the scenario chart
pub struct DataLogger {
    config: VisualizerConfig,
    windows: MetricWindows,
    view: Option<ChartView>,
    started: Instant,
    appended: usize,
    redraws: usize,
    png_path: PathBuf,
    svg_path: PathBuf,
}

impl DataLogger {
    /// Create a logger; the output file names are fixed from the current
    /// local time
    pub fn new(config: VisualizerConfig) -> Self {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let stem = format!("{}_{}", config.file_prefix, stamp);
        let png_path = config.output_dir.join(format!("{stem}.png"));
        let svg_path = config.output_dir.join(format!("{stem}.svg"));
        info!(
            "Data logger ready (capacity {}, figures -> {})",
            config.capacity,
            config.output_dir.display()
        );

        Self {
            windows: MetricWindows::new(config.capacity),
            view: None,
            started: Instant::now(),
            appended: 0,
            redraws: 0,
            png_path,
            svg_path,
            config,
        }
    }

    /// Append a sample timestamped against the logger start
    pub fn add_data(
        &mut self,
        distance: f64,
        ttc: f64,
        ego_speed: f64,
        front_speed: f64,
        aeb_active: bool,
    ) {
        let t = self.started.elapsed().as_secs_f64();
        self.add_data_at(t, distance, ttc, ego_speed, front_speed, aeb_active);
    }

    /// Append a sample at an explicit time (seconds since start).
    ///
    /// Speeds arrive in m/s and are stored in km/h; TTC is clamped to the
    /// configured ceiling for plotting only.
    pub fn add_data_at(
        &mut self,
        time: f64,
        distance: f64,
        ttc: f64,
        ego_speed: f64,
        front_speed: f64,
        aeb_active: bool,
    ) {
        self.windows.push(MetricSample {
            time,
            distance,
            ttc: ttc.min(self.config.ttc_ceiling),
            ego_speed: ego_speed * MPS_TO_KMH,
            front_speed: front_speed * MPS_TO_KMH,
            aeb: if aeb_active { 1.0 } else { 0.0 },
        });
        self.appended += 1;

        if self.config.redraw_every > 0 && self.appended % self.config.redraw_every == 0 {
            self.redraw();
        }
    }

    /// Recompute the chart view and refresh the live preview if one is
    /// configured. Rendering problems are logged, never returned.
    pub fn redraw(&mut self) {
        if self.windows.len() < 2 {
            return;
        }

        let view = ChartView::from_windows(&self.windows, self.config.window_secs);
        self.redraws += 1;

        if let Some(preview) = &self.config.live_preview {
            let dpi = self.config.live_preview_dpi;
            let size = self.config.figure_pixels(dpi);
            if let Err(e) = render_png(preview, &view, size, dpi as f64 / 100.0) {
                warn!("Plot update failed: {}", e);
            }
        }
        self.view = Some(view);
    }

    /// Write the figure as PNG and SVG, creating the output directory if
    /// needed. Calling it again overwrites the same two files.
    pub fn persist(&self) -> Result<[PathBuf; 2], VisualizerError> {
        fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            VisualizerError::OutputDir(format!("{}: {}", self.config.output_dir.display(), e))
        })?;

        let view = ChartView::from_windows(&self.windows, self.config.window_secs);
        let dpi = self.config.dpi;
        let size = self.config.figure_pixels(dpi);
        let scale = dpi as f64 / 100.0;

        render_png(&self.png_path, &view, size, scale)?;
        render_svg(&self.svg_path, &view, size, scale)?;

        info!("Saved plots: {}", self.png_path.display());
        info!("Saved plots: {}", self.svg_path.display());
        debug!("{} samples in final figure", self.windows.len());
        Ok([self.png_path.clone(), self.svg_path.clone()])
    }

    pub fn windows(&self) -> &MetricWindows {
        &self.windows
    }

    /// Chart view from the latest redraw
    pub fn view(&self) -> Option<&ChartView> {
        self.view.as_ref()
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    pub fn png_path(&self) -> &Path {
        &self.png_path
    }

    pub fn svg_path(&self) -> &Path {
        &self.svg_path
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &Path) -> VisualizerConfig {
        VisualizerConfig {
            output_dir: dir.join("figures"),
            dpi: 10,
            ..Default::default()
        }
    }

    #[test]
    fn test_file_names_carry_timestamp() {
        let logger = DataLogger::new(VisualizerConfig::default());
        let name = logger.png_path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("aeb_scenario1_plots_"));
        assert!(name.ends_with(".png"));
        // YYYYMMDD_HHMMSS + ".png"
        assert_eq!(name.len(), "aeb_scenario1_plots_".len() + 15 + 4);
        assert_eq!(logger.png_path().with_extension("svg"), logger.svg_path());
    }

    #[test]
    fn test_add_data_converts_units() {
        let mut logger = DataLogger::new(VisualizerConfig::default());
        logger.add_data_at(0.0, 46.0, f64::INFINITY, 10.0, 0.0, false);
        logger.add_data_at(0.05, 45.5, 4.0, 10.0, 5.0, true);

        let samples = logger.windows().samples();
        assert_eq!(samples[0].ttc, 10.0);
        assert_eq!(samples[0].ego_speed, 36.0);
        assert_eq!(samples[0].aeb, 0.0);
        assert_eq!(samples[1].ttc, 4.0);
        assert_eq!(samples[1].front_speed, 18.0);
        assert_eq!(samples[1].aeb, 1.0);
    }

    #[test]
    fn test_redraw_every_fifth_append() {
        let mut logger = DataLogger::new(VisualizerConfig {
            capacity: 6,
            ..Default::default()
        });
        for i in 0..4 {
            logger.add_data_at(i as f64 * 0.05, 40.0, 5.0, 8.0, 0.0, false);
        }
        assert_eq!(logger.redraw_count(), 0);
        assert!(logger.view().is_none());

        logger.add_data_at(0.2, 40.0, 5.0, 8.0, 0.0, false);
        assert_eq!(logger.redraw_count(), 1);

        // Keeps firing periodically after the window has filled
        for i in 5..15 {
            logger.add_data_at(i as f64 * 0.05, 40.0, 5.0, 8.0, 0.0, false);
        }
        assert_eq!(logger.windows().len(), 6);
        assert_eq!(logger.redraw_count(), 3);
    }

    #[test]
    fn test_redraw_needs_two_samples() {
        let mut logger = DataLogger::new(VisualizerConfig::default());
        logger.redraw();
        logger.add_data_at(0.0, 40.0, 5.0, 8.0, 0.0, false);
        logger.redraw();
        assert_eq!(logger.redraw_count(), 0);

        logger.add_data_at(0.05, 40.0, 5.0, 8.0, 0.0, false);
        logger.redraw();
        assert_eq!(logger.redraw_count(), 1);
        let x_range = &logger.view().unwrap().x_range;
        assert_eq!(x_range.start, 0.0);
        assert!((x_range.end - 2.05).abs() < 1e-9);
    }

    #[test]
    fn test_persist_twice() {
        let dir = tempfile::tempdir().unwrap();
        let mut logger = DataLogger::new(test_config(dir.path()));
        for i in 0..20 {
            let t = i as f64 * 0.05;
            logger.add_data_at(t, 46.0 - t, 6.0, 10.0, 0.0, i > 10);
        }

        let first = logger.persist().unwrap();
        assert!(first[0].exists());
        assert!(first[1].exists());
        fs::remove_file(&first[0]).unwrap();
        fs::remove_file(&first[1]).unwrap();

        let second = logger.persist().unwrap();
        assert_eq!(first, second);
        assert!(second[0].exists());
        assert!(second[1].exists());
        assert!(fs::metadata(&second[0]).unwrap().len() > 0);
        assert!(fs::metadata(&second[1]).unwrap().len() > 0);
    }

    #[test]
    fn test_persist_into_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.output_dir).unwrap();

        let logger = DataLogger::new(config);
        let paths = logger.persist().unwrap();
        assert!(paths[0].starts_with(dir.path().join("figures")));
        assert!(paths[0].exists());
        assert!(paths[1].exists());
    }
}
