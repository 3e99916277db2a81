//! Decoded model fragments
//!
//! A [`SceneFragment`] is what the asset loader hands back: a named set of
//! meshes with their node transforms already flattened, plus a root rotation
//! the controller may adjust before insertion.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use std::sync::Arc;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// CPU-side triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex3D>,
    pub indices: Vec<u32>,
    /// Node transform within the fragment
    pub transform: Mat4,
    pub base_color: [f32; 4],
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertices transformed by `model`, normals by its inverse transpose
    pub fn world_vertices(&self, model: Mat4) -> Vec<Vertex3D> {
        let world = model * self.transform;
        let normal_matrix = world.inverse().transpose();
        self.vertices
            .iter()
            .map(|v| {
                let position = world.transform_point3(Vec3::from(v.position));
                let normal = normal_matrix
                    .transform_vector3(Vec3::from(v.normal))
                    .normalize_or_zero();
                Vertex3D {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: v.uv,
                }
            })
            .collect()
    }
}

/// Renderable subtree produced by decoding one asset
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFragment {
    pub name: String,
    pub meshes: Vec<Arc<MeshData>>,
    pub rotation: Quat,
}

impl SceneFragment {
    pub fn new(name: impl Into<String>, meshes: Vec<MeshData>) -> Self {
        Self {
            name: name.into(),
            meshes: meshes.into_iter().map(Arc::new).collect(),
            rotation: Quat::IDENTITY,
        }
    }

    pub fn root_transform(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }

    pub fn mesh_names(&self) -> impl Iterator<Item = &str> {
        self.meshes.iter().map(|m| m.name.as_str())
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangle_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData {
            name: "quad".into(),
            vertices: vec![
                Vertex3D { position: [0.0, 0.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 0.0] },
                Vertex3D { position: [1.0, 0.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 0.0] },
                Vertex3D { position: [1.0, 1.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [1.0, 1.0] },
                Vertex3D { position: [0.0, 1.0, 0.0], normal: [0.0, 0.0, 1.0], uv: [0.0, 1.0] },
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
            transform: Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0)),
            base_color: [1.0; 4],
        }
    }

    #[test]
    fn test_world_vertices_apply_node_and_root() {
        let mesh = quad();
        let root = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let world = mesh.world_vertices(root);

        // (0,0,2) rotated 90 degrees about Y lands on +X
        let p = Vec3::from(world[0].position);
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        let n = Vec3::from(world[0].normal);
        assert!((n - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_fragment_summary() {
        let fragment = SceneFragment::new("tile", vec![quad()]);
        assert_eq!(fragment.triangle_count(), 2);
        assert_eq!(fragment.mesh_names().collect::<Vec<_>>(), vec!["quad"]);
        assert_eq!(fragment.root_transform(), Mat4::IDENTITY);
    }
}
