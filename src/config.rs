//! Viewer configuration
//!
//! Defaults come from [`crate::constants`]. A JSON file can override any
//! subset of fields; it is looked up at `$ORBIT_VIEWER_CONFIG`, then at
//! `<config dir>/orbit-viewer/config.json`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::ViewerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: constants::camera::FOV_DEGREES,
            near: constants::camera::NEAR,
            far: constants::camera::FAR,
            position: constants::camera::HOME_POSITION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: constants::controls::DAMPING_FACTOR,
            auto_rotate: true,
            auto_rotate_speed: constants::controls::AUTO_ROTATE_SPEED,
            rotate_speed: constants::controls::ROTATE_SPEED,
            zoom_speed: constants::controls::ZOOM_SPEED,
            pan_speed: constants::controls::PAN_SPEED,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    pub antialias: bool,
    /// Clear to a transparent background instead of an opaque one
    pub transparent: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self { antialias: true, transparent: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub sky_color: u32,
    pub ground_color: u32,
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            sky_color: constants::light::SKY_COLOR,
            ground_color: constants::light::GROUND_COLOR,
            intensity: constants::light::INTENSITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Location of the bundled default asset
    pub default_asset: String,
    /// Suffix a dropped file name must end with
    pub accepted_extension: String,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub renderer: RendererOptions,
    pub light: LightConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            default_asset: constants::DEFAULT_ASSET_LOCATION.to_string(),
            accepted_extension: constants::MODEL_FILE_EXTENSION.to_string(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            renderer: RendererOptions::default(),
            light: LightConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Load from the first config file found, falling back to defaults.
    ///
    /// A file that exists but fails to parse is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match Self::load_from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ViewerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ViewerError::Config(format!("{}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Config file to read, if one exists
    pub fn config_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(constants::CONFIG_ENV_VAR) {
            return Some(PathBuf::from(explicit));
        }
        let path = dirs::config_dir()?.join(constants::APP_NAME).join("config.json");
        path.exists().then_some(path)
    }
}
