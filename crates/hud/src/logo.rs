//! HUD logo loading

use image::imageops::FilterType;
use image::RgbaImage;
use std::path::Path;
use tracing::{debug, warn};

pub const LOGO_WIDTH: u32 = 100;
pub const LOGO_HEIGHT: u32 = 35;

/// Channel value above which a pixel counts as background white
const WHITE_KEY_THRESHOLD: u8 = 240;

/// Load the logo, resize it to 100x35 and key out its white background.
///
/// A missing or undecodable file is logged and yields `None`.
pub fn load_logo(path: &Path) -> Option<RgbaImage> {
    if !path.exists() {
        warn!("HUD logo not found at {}", path.display());
        return None;
    }

    match image::open(path) {
        Ok(img) => {
            let resized = image::imageops::resize(
                &img.to_rgba8(),
                LOGO_WIDTH,
                LOGO_HEIGHT,
                FilterType::Triangle,
            );
            debug!("HUD logo loaded from {}", path.display());
            Some(key_white(resized))
        }
        Err(e) => {
            warn!("Failed to load HUD logo {}: {}", path.display(), e);
            None
        }
    }
}

/// Make every near-white pixel fully transparent
pub fn key_white(mut img: RgbaImage) -> RgbaImage {
    for pixel in img.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r > WHITE_KEY_THRESHOLD && g > WHITE_KEY_THRESHOLD && b > WHITE_KEY_THRESHOLD {
            pixel.0 = [0, 0, 0, 0];
        }
    }
    img
}
