//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Accepted suffix for dropped model files (exact, case-sensitive match)
pub const MODEL_FILE_EXTENSION: &str = ".glb";

/// Bundled default asset, relative to the executable's directory
pub const DEFAULT_ASSET_LOCATION: &str = "assets/planet.glb";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ORBIT_VIEWER_CONFIG";

/// Application name used for the window title and config directory
pub const APP_NAME: &str = "orbit-viewer";

/// Perspective camera defaults
pub mod camera {
    /// Vertical field of view in degrees
    pub const FOV_DEGREES: f32 = 50.0;

    pub const NEAR: f32 = 0.1;

    pub const FAR: f32 = 1000.0;

    /// Home position; the camera always looks at the origin from here
    pub const HOME_POSITION: [f32; 3] = [0.0, 0.0, 8.0];
}

/// Orbit controls defaults
pub mod controls {
    pub const DAMPING_FACTOR: f32 = 0.05;

    /// Full turns per minute at 60fps, matching orbit-control conventions
    pub const AUTO_ROTATE_SPEED: f32 = 8.0;

    pub const ROTATE_SPEED: f32 = 1.0;

    pub const ZOOM_SPEED: f32 = 1.0;

    pub const PAN_SPEED: f32 = 1.0;

    pub const MIN_DISTANCE: f32 = 0.0;

    pub const MAX_DISTANCE: f32 = f32::INFINITY;

    /// Polar angle margin that keeps the camera off the poles
    pub const POLAR_EPSILON: f32 = 1.0e-6;

    /// Scroll points that count as one wheel notch
    pub const SCROLL_STEP: f32 = 50.0;
}

/// Hemisphere light defaults
pub mod light {
    pub const SKY_COLOR: u32 = 0xffffff;

    pub const GROUND_COLOR: u32 = 0x444444;

    pub const INTENSITY: f32 = 1.0;
}

/// Default asset tilt, applied only on the default-asset path
pub mod default_asset {
    use std::f32::consts::PI;

    /// Rotation about X in radians (-18 degrees)
    pub const TILT_X: f32 = -PI / 10.0;

    /// Rotation about Z in radians (36 degrees)
    pub const TILT_Z: f32 = PI / 5.0;
}

/// UI spacing and sizing constants
pub mod ui {
    /// Default window size
    pub const DEFAULT_WINDOW_SIZE: [f32; 2] = [1024.0, 768.0];

    /// Smallest viewer rect in points along either axis
    pub const MIN_VIEWER_SIZE: f32 = 1.0;

    /// Default margin for overlay frames
    pub const DEFAULT_FRAME_MARGIN: f32 = 8.0;

    /// Default rounding for overlay frames
    pub const DEFAULT_FRAME_ROUNDING: f32 = 4.0;
}
