//! Scenario HUD
//!
//! Builds the status lines shown to the operator and draws them onto an
//! RGB surface that can be snapshotted to PNG.

pub mod config;
pub mod lines;
pub mod logo;
pub mod renderer;

pub use config::HudConfig;
pub use lines::{hud_lines, HudLine, HudMetrics};
pub use logo::{key_white, load_logo};
pub use renderer::HudRenderer;

use thiserror::Error;

/// HUD errors
#[derive(Debug, Error)]
pub enum HudError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Drawing error: {0}")]
    Draw(String),

    #[error("Surface buffer size mismatch")]
    Surface,
}
