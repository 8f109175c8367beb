/// application settings for the route viewer
/// loaded once at startup from settings.json (defaults when missing)
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::camera::CameraMode;

pub const SETTINGS_FILE: &str = "settings.json";

/// how towns are placed on the map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TownLayout {
    /// explicit towns: [x, y, speed_limit] in world units
    Fixed(Vec<[f32; 3]>),
    /// deterministic random placement inside the world bounds
    Scattered { count: usize, seed: u64 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TownSettings {
    pub layout: TownLayout,
    /// side length of the square marker drawn for each town
    pub marker_size: f32,
    pub marker_color: [u8; 4],
    /// keep scattered towns this far away from the world edges
    pub margin: f32,
    /// speed limit range for scattered towns
    pub speed_min: f32,
    pub speed_max: f32,
}

impl Default for TownSettings {
    fn default() -> Self {
        Self {
            layout: TownLayout::Scattered { count: 40, seed: 7 },
            marker_size: 14.0,
            marker_color: [200, 40, 40, 255],
            margin: 150.0,
            speed_min: 30.0,
            speed_max: 110.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct OptimizerSettings {
    pub seed: u64,
    /// candidate reversals evaluated in parallel per generation
    pub batch_size: usize,
    /// generations without improvement before the run counts as completed
    pub stall_generations: u64,
    /// weight of travel time relative to distance in the search cost (0 = distance only)
    pub time_weight: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            seed: 0xDEADBEEF,
            batch_size: 64,
            stall_generations: 2_000,
            time_weight: 0.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    pub window_title: String,

    // world / camera
    pub world_width: f32,
    pub world_height: f32,
    pub camera_mode: CameraMode,

    // text
    /// font file; None uses the built-in proportional font
    pub font_path: Option<PathBuf>,
    pub text_size: f32,
    pub text_color: [u8; 4],
    /// summary colour once the optimizer has stopped improving
    pub completed_color: [u8; 4],
    pub background_color: [u8; 4],

    // path
    pub path_color: [u8; 4],
    pub path_thickness: f32,
    /// draw the edge from the last town back to the first
    pub close_loop: bool,

    pub towns: TownSettings,
    pub optimizer: OptimizerSettings,

    /// render cadence in milliseconds
    pub frame_interval_ms: u64,
    /// start the driver immediately instead of waiting for Space
    pub autostart: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_title: "Route Viewer".to_owned(),
            world_width: 1920.0,
            world_height: 1080.0,
            camera_mode: CameraMode::SinglePlayer,
            font_path: None,
            text_size: 28.0,
            text_color: [0, 0, 0, 255],
            completed_color: [0, 160, 0, 255],
            background_color: [235, 235, 225, 255],
            path_color: [30, 30, 160, 255],
            path_thickness: 3.0,
            close_loop: true,
            towns: TownSettings::default(),
            optimizer: OptimizerSettings::default(),
            frame_interval_ms: 16,
            autostart: true,
        }
    }
}

impl AppSettings {
    /// load settings from settings.json in the working directory
    pub fn load() -> Self {
        Self::load_from(SETTINGS_FILE)
    }

    /// load settings from a JSON file, or return defaults if it is missing or malformed
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                // file doesn't exist or can't be read - use defaults
                tracing::info!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            }
        }
    }

    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

/// [r, g, b, a] from the settings file into an egui colour
pub fn color32(rgba: [u8; 4]) -> eframe::egui::Color32 {
    eframe::egui::Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}
