//! HUD surface rendering

use image::{RgbImage, RgbaImage};
use plotters::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, trace, warn};

use crate::config::HudConfig;
use crate::lines::{hud_lines, HudLine, HudMetrics};
use crate::logo::load_logo;
use crate::HudError;

const LOGO_POS: (u32, u32) = (10, 10);
const TEXT_X: i32 = 10;
const TEXT_TOP_WITH_LOGO: i32 = 50;
const TEXT_TOP: i32 = 20;
const LINE_SPACING: i32 = 22;
const FONT_SIZE: u32 = 16;

/// Draws HUD frames onto an in-memory RGB surface
pub struct HudRenderer {
    config: HudConfig,
    logo: Option<RgbaImage>,
    surface: Vec<u8>,
    frames: u64,
    text_warned: bool,
}

impl HudRenderer {
    /// Create a renderer, loading the configured logo if any
    pub fn new(config: HudConfig) -> Self {
        let logo = config.logo_path.as_deref().and_then(load_logo);
        Self::with_logo(config, logo)
    }

    pub fn with_logo(config: HudConfig, logo: Option<RgbaImage>) -> Self {
        let surface = vec![0; (config.width * config.height * 3) as usize];
        Self {
            config,
            logo,
            surface,
            frames: 0,
            text_warned: false,
        }
    }

    /// Redraw the whole HUD for this tick. Failures are logged only.
    pub fn draw(&mut self, metrics: &HudMetrics) {
        self.surface.fill(0);

        let text_top = if let Some(logo) = &self.logo {
            blit_alpha(&mut self.surface, self.config.width, logo, LOGO_POS);
            TEXT_TOP_WITH_LOGO
        } else {
            TEXT_TOP
        };

        let lines = hud_lines(metrics);
        for line in &lines {
            trace!(target: "hud", "{}", line.text);
        }

        if let Err(e) = self.draw_text(&lines, text_top) {
            if !self.text_warned {
                warn!("HUD text rendering failed: {}", e);
                self.text_warned = true;
            } else {
                debug!("HUD text rendering failed: {}", e);
            }
        }
        self.frames += 1;
    }

    fn draw_text(&mut self, lines: &[HudLine], top: i32) -> Result<(), HudError> {
        let size = (self.config.width, self.config.height);
        let root = BitMapBackend::with_buffer(&mut self.surface, size).into_drawing_area();

        let mut y = top;
        for line in lines {
            let [r, g, b] = line.color;
            let style = ("sans-serif", FONT_SIZE)
                .into_font()
                .color(&RGBColor(r, g, b));
            root.draw(&Text::new(line.text.as_str(), (TEXT_X, y), style))
                .map_err(|e| HudError::Draw(e.to_string()))?;
            y += LINE_SPACING;
        }
        root.present().map_err(|e| HudError::Draw(e.to_string()))
    }

    /// Write the current frame as PNG
    pub fn snapshot(&self, path: &Path) -> Result<(), HudError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| HudError::Draw(e.to_string()))?;
        }
        let img = RgbImage::from_raw(self.config.width, self.config.height, self.surface.clone())
            .ok_or(HudError::Surface)?;
        img.save(path)?;
        debug!("HUD snapshot written to {}", path.display());
        Ok(())
    }

    /// Color of one surface pixel
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.config.width || y >= self.config.height {
            return None;
        }
        let i = ((y * self.config.width + x) * 3) as usize;
        Some([self.surface[i], self.surface[i + 1], self.surface[i + 2]])
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    /// Frames drawn so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &HudConfig {
        &self.config
    }
}

/// Alpha-blend `src` onto an RGB buffer of the given width
fn blit_alpha(dst: &mut [u8], dst_width: u32, src: &RgbaImage, at: (u32, u32)) {
    let dst_height = dst.len() as u32 / (dst_width * 3);
    for (x, y, pixel) in src.enumerate_pixels() {
        let (dx, dy) = (at.0 + x, at.1 + y);
        if dx >= dst_width || dy >= dst_height {
            continue;
        }
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            continue;
        }
        let i = ((dy * dst_width + dx) * 3) as usize;
        let alpha = a as u32;
        for (c, v) in [r, g, b].into_iter().enumerate() {
            let under = dst[i + c] as u32;
            dst[i + c] = ((v as u32 * alpha + under * (255 - alpha)) / 255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn logo() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(100, 35, Rgba([0, 0, 0, 0]));
        img.put_pixel(0, 0, Rgba([200, 10, 10, 255]));
        img
    }

    #[test]
    fn test_surface_size() {
        let renderer = HudRenderer::with_logo(HudConfig::default(), None);
        assert_eq!(renderer.surface.len(), 400 * 420 * 3);
        assert_eq!(renderer.pixel(399, 419), Some([0, 0, 0]));
        assert_eq!(renderer.pixel(400, 0), None);
    }

    #[test]
    fn test_logo_drawn_at_offset() {
        let mut renderer = HudRenderer::with_logo(HudConfig::default(), Some(logo()));
        renderer.draw(&HudMetrics::default());
        assert_eq!(renderer.pixel(10, 10), Some([200, 10, 10]));
        // Transparent logo pixels leave the background black
        assert_eq!(renderer.pixel(60, 30), Some([0, 0, 0]));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn test_draw_clears_previous_frame() {
        let mut renderer = HudRenderer::with_logo(HudConfig::default(), Some(logo()));
        renderer.draw(&HudMetrics::default());
        renderer.logo = None;
        renderer.draw(&HudMetrics::default());
        assert_eq!(renderer.pixel(10, 10), Some([0, 0, 0]));
    }

    #[test]
    fn test_blit_alpha_blends() {
        let mut dst = vec![0u8; 2 * 1 * 3];
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, Rgba([255, 255, 255, 255]));
        src.put_pixel(1, 0, Rgba([255, 0, 0, 51]));
        blit_alpha(&mut dst, 2, &src, (0, 0));
        assert_eq!(&dst[0..3], &[255, 255, 255]);
        assert_eq!(&dst[3..6], &[51, 0, 0]);
    }

    #[test]
    fn test_snapshot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hud").join("frame.png");
        let mut renderer = HudRenderer::with_logo(HudConfig::default(), Some(logo()));
        renderer.draw(&HudMetrics::default());
        renderer.snapshot(&path).unwrap();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (400, 420));
        assert_eq!(saved.get_pixel(10, 10).0, [200, 10, 10]);
    }
}
