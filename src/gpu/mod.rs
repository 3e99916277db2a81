//! GPU rendering
//!
//! - [`config`] - pipeline settings kept in step with the eframe window
//! - [`renderer`] - the [`Renderer`] seam and its wgpu implementation
//! - [`callback`] - egui paint callback and the GPU resources it draws with
//! - `shaders/` - WGSL for the mesh pipeline

pub mod callback;
pub mod config;
pub mod renderer;

pub use callback::{GpuVertex, ScenePaintCallback, SceneUniforms, ViewerGpuResources};
pub use config::GraphicsConfig;
pub use renderer::{Renderer, WgpuRenderer};
