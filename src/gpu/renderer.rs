//! Scene renderer

use super::callback::{ScenePaintCallback, SceneUniforms, ViewerGpuResources};
use super::config::GraphicsConfig;
use crate::config::RendererOptions;
use crate::scene::{HemisphereLight, SceneGraph};
use crate::viewport::PerspectiveCamera;

/// Draws a scene graph through a camera into the surface it was created for
pub trait Renderer {
    /// Drawable size in logical points
    fn set_size(&mut self, width: f32, height: f32);

    fn set_pixel_ratio(&mut self, ratio: f32);

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera);

    /// Release GPU resources. Further `render` calls are ignored.
    fn dispose(&mut self);
}

/// Renderer backed by eframe's wgpu state.
///
/// `render` does not touch the GPU directly: it records a
/// [`ScenePaintCallback`] that the app hands to egui via [`WgpuRenderer::take_frame`].
pub struct WgpuRenderer {
    render_state: egui_wgpu::RenderState,
    config: GraphicsConfig,
    size: (f32, f32),
    pixel_ratio: f32,
    frame: Option<ScenePaintCallback>,
    frames_rendered: u64,
    disposed: bool,
}

impl WgpuRenderer {
    pub fn new(render_state: &egui_wgpu::RenderState, options: RendererOptions) -> Self {
        let config = GraphicsConfig::new(options, render_state.target_format);
        let resources = ViewerGpuResources::new(&render_state.device, &config);
        render_state
            .renderer
            .write()
            .callback_resources
            .insert(resources);

        log::info!(
            "Created wgpu renderer ({:?}, {}x MSAA)",
            config.texture_format,
            config.sample_count
        );

        Self {
            render_state: render_state.clone(),
            config,
            size: (0.0, 0.0),
            pixel_ratio: 1.0,
            frame: None,
            frames_rendered: 0,
            disposed: false,
        }
    }

    /// Frame recorded by the last `render`, if not yet taken
    pub fn take_frame(&mut self) -> Option<ScenePaintCallback> {
        self.frame.take()
    }

    pub fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    /// Drawable size in physical pixels
    pub fn size_px(&self) -> (u32, u32) {
        physical_size(self.size, self.pixel_ratio)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Renderer for WgpuRenderer {
    fn set_size(&mut self, width: f32, height: f32) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
        if self.disposed {
            return;
        }
        let (width, height) = self.size_px();
        if width == 0 || height == 0 {
            self.frame = None;
            return;
        }

        let light = scene.light().copied().unwrap_or_else(HemisphereLight::default);
        let meshes = scene
            .fragments()
            .flat_map(|fragment| {
                let root = fragment.root_transform();
                fragment.meshes.iter().map(move |mesh| (mesh.clone(), root))
            })
            .collect();

        self.frame = Some(ScenePaintCallback {
            uniforms: SceneUniforms::new(camera, &light),
            revision: scene.revision(),
            meshes,
        });
        self.frames_rendered += 1;
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.frame = None;
        self.render_state
            .renderer
            .write()
            .callback_resources
            .remove::<ViewerGpuResources>();
        log::info!("Disposed wgpu renderer after {} frames", self.frames_rendered);
    }
}

fn physical_size(size: (f32, f32), pixel_ratio: f32) -> (u32, u32) {
    (
        (size.0 * pixel_ratio).round().max(0.0) as u32,
        (size.1 * pixel_ratio).round().max(0.0) as u32,
    )
}

impl Drop for WgpuRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}
