//! egui paint callback that draws the viewer scene
//!
//! Long-lived GPU objects sit in egui_wgpu's `callback_resources` as
//! [`ViewerGpuResources`]. Each frame the renderer hands egui a
//! [`ScenePaintCallback`] carrying that frame's uniforms and, by `Arc`, the
//! meshes to draw; vertex data is only re-uploaded when the scene revision
//! changes.

use std::mem;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use egui_wgpu::CallbackTrait;
use glam::Mat4;
use wgpu::util::DeviceExt;

use super::config::GraphicsConfig;
use crate::scene::{HemisphereLight, MeshData};
use crate::viewport::PerspectiveCamera;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl GpuVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x4,
        },
    ];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// World-space vertices for `mesh` placed by `model`
pub fn mesh_vertices(mesh: &MeshData, model: Mat4) -> Vec<GpuVertex> {
    mesh.world_vertices(model)
        .into_iter()
        .map(|v| GpuVertex {
            position: v.position,
            normal: v.normal,
            color: mesh.base_color,
        })
        .collect()
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub sky_color: [f32; 4],
    /// rgb ground colour, w light intensity
    pub ground_color: [f32; 4],
}

impl SceneUniforms {
    pub fn new(camera: &PerspectiveCamera, light: &HemisphereLight) -> Self {
        let [sr, sg, sb] = light.sky_color;
        let [gr, gg, gb] = light.ground_color;
        Self {
            view_proj: camera.build_view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            sky_color: [sr, sg, sb, 1.0],
            ground_color: [gr, gg, gb, light.intensity],
        }
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Pipeline and buffers owned by one [`super::WgpuRenderer`]
pub struct ViewerGpuResources {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    meshes: Vec<GpuMesh>,
    revision: Option<u64>,
}

impl ViewerGpuResources {
    pub fn new(device: &wgpu::Device, config: &GraphicsConfig) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Viewer Uniform Buffer"),
            size: mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("Viewer Bind Group Layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("Viewer Bind Group"),
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Viewer Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Viewer Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Viewer Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            cache: None,
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(config.color_target_state())],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // glTF models are not guaranteed to be closed
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(config.depth_stencil_state()),
            multisample: config.multisample_state(),
            multiview: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            meshes: Vec::new(),
            revision: None,
        }
    }

    fn upload(&mut self, device: &wgpu::Device, meshes: &[(Arc<MeshData>, Mat4)], revision: u64) {
        self.meshes = meshes
            .iter()
            .filter(|(mesh, _)| !mesh.indices.is_empty())
            .map(|(mesh, model)| {
                let vertices = mesh_vertices(mesh, *model);
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&mesh.name),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&mesh.name),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                }
            })
            .collect();
        self.revision = Some(revision);
        log::debug!("Uploaded {} meshes for scene revision {}", self.meshes.len(), revision);
    }
}

/// One frame's draw request
#[derive(Clone)]
pub struct ScenePaintCallback {
    pub uniforms: SceneUniforms,
    pub revision: u64,
    /// Meshes with their world transform
    pub meshes: Vec<(Arc<MeshData>, Mat4)>,
}

impl CallbackTrait for ScenePaintCallback {
    fn prepare(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        _egui_encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(resources) = callback_resources.get_mut::<ViewerGpuResources>() else {
            return Vec::new();
        };

        queue.write_buffer(&resources.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        if resources.revision != Some(self.revision) {
            resources.upload(device, &self.meshes, self.revision);
        }
        Vec::new()
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        callback_resources: &egui_wgpu::CallbackResources,
    ) {
        let Some(resources) = callback_resources.get::<ViewerGpuResources>() else {
            return;
        };

        render_pass.set_pipeline(&resources.pipeline);
        render_pass.set_bind_group(0, &resources.bind_group, &[]);
        for mesh in &resources.meshes {
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Vertex3D;
    use glam::Vec3;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(mem::size_of::<GpuVertex>(), 40);
        assert_eq!(GpuVertex::desc().array_stride, 40);
        assert_eq!(mem::size_of::<SceneUniforms>() % 16, 0);
    }

    #[test]
    fn test_mesh_vertices_carry_base_color() {
        let mesh = MeshData {
            name: "tri".into(),
            vertices: vec![
                Vertex3D { position: [0.0, 0.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 0.0] },
                Vertex3D { position: [1.0, 0.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 0.0] },
                Vertex3D { position: [0.0, 1.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 1.0] },
            ],
            indices: vec![0, 1, 2],
            transform: Mat4::IDENTITY,
            base_color: [0.2, 0.4, 0.6, 1.0],
        };
        let vertices = mesh_vertices(&mesh, Mat4::from_translation(Vec3::Y));
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 1.0, 0.0]);
        assert!(vertices.iter().all(|v| v.color == [0.2, 0.4, 0.6, 1.0]));
    }

    #[test]
    fn test_uniforms_pack_light() {
        let camera = PerspectiveCamera::default();
        let light = HemisphereLight::new(0xffffff, 0x444444, 0.5);
        let uniforms = SceneUniforms::new(&camera, &light);
        assert_eq!(uniforms.sky_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniforms.ground_color[3], 0.5);
        assert_eq!(uniforms.camera_pos[3], 1.0);
    }
}
