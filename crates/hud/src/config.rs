//! HUD configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HUD configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HudConfig {
    /// Surface width (pixels)
    pub width: u32,

    /// Surface height (pixels)
    pub height: u32,

    /// Optional logo drawn in the top-left corner
    pub logo_path: Option<PathBuf>,

    /// Where the final HUD frame is written on shutdown
    pub snapshot_path: Option<PathBuf>,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 420,
            logo_path: None,
            snapshot_path: Some(PathBuf::from("figures/aeb_scenario1_hud.png")),
        }
    }
}
