//! Graphics settings shared by the eframe window and the mesh pipeline

use crate::config::RendererOptions;

/// Sample count used when antialiasing is requested
pub const MSAA_SAMPLES: u32 = 4;

/// Pipeline settings; must agree with the eframe `NativeOptions` the window was
/// created with or wgpu rejects the paint callback's pipeline.
#[derive(Debug, Clone, Copy)]
pub struct GraphicsConfig {
    pub sample_count: u32,
    pub texture_format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub transparent: bool,
}

impl GraphicsConfig {
    pub fn new(options: RendererOptions, texture_format: wgpu::TextureFormat) -> Self {
        Self {
            sample_count: sample_count(options),
            texture_format,
            depth_format: wgpu::TextureFormat::Depth32Float,
            transparent: options.transparent,
        }
    }

    pub fn multisample_state(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }

    pub fn color_target_state(&self) -> wgpu::ColorTargetState {
        let blend = if self.transparent {
            wgpu::BlendState::ALPHA_BLENDING
        } else {
            wgpu::BlendState::REPLACE
        };
        wgpu::ColorTargetState {
            format: self.texture_format,
            blend: Some(blend),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }

    pub fn depth_stencil_state(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: self.depth_format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }
}

/// Sample count for eframe's `NativeOptions::multisampling`
pub fn sample_count(options: RendererOptions) -> u32 {
    if options.antialias {
        MSAA_SAMPLES
    } else {
        1
    }
}

/// Depth bits for eframe's `NativeOptions::depth_buffer`; matches `Depth32Float`
pub const DEPTH_BUFFER_BITS: u8 = 32;
