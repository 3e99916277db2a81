//! Hemisphere light

use crate::constants;

/// Sky/ground gradient light. Exactly one lives in every non-empty scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky_color: [f32; 3],
    pub ground_color: [f32; 3],
    pub intensity: f32,
}

impl HemisphereLight {
    pub fn new(sky_hex: u32, ground_hex: u32, intensity: f32) -> Self {
        Self {
            sky_color: hex_to_rgb(sky_hex),
            ground_color: hex_to_rgb(ground_hex),
            intensity,
        }
    }
}

impl Default for HemisphereLight {
    fn default() -> Self {
        Self::new(
            constants::light::SKY_COLOR,
            constants::light::GROUND_COLOR,
            constants::light::INTENSITY,
        )
    }
}

/// Convert 0xRRGGBB to linear-ish [0, 1] floats
fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}
