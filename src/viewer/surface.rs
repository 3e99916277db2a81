//! Drawable surface the viewer renders into

use crate::config::RendererOptions;
use crate::error::ViewerError;
use crate::gpu::Renderer;

/// Size of the viewer's drawable region in logical points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height; a zero height is treated as one point
    pub fn aspect(&self) -> f32 {
        self.width / self.height.max(1.0)
    }

    pub fn to_pixels(&self, pixel_ratio: f32) -> (u32, u32) {
        (
            (self.width * pixel_ratio).round().max(1.0) as u32,
            (self.height * pixel_ratio).round().max(1.0) as u32,
        )
    }
}

/// Host-side surface: reports pixel density and builds the renderer bound to it
pub trait RenderSurface {
    type Renderer: Renderer;

    /// Physical pixels per logical point, read fresh on every call
    fn device_pixel_ratio(&self) -> f32;

    fn create_renderer(&mut self, options: RendererOptions) -> Result<Self::Renderer, ViewerError>;
}
