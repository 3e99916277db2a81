//! Binary glTF (GLB) decoding

use glam::{Mat4, Vec3};
use std::collections::HashSet;
use std::sync::Arc;

use super::{AssetLoader, AssetLocation, LoadFuture};
use crate::error::ViewerError;
use crate::scene::{MeshData, SceneFragment, Vertex3D};

/// First four bytes of every GLB container
pub const GLB_MAGIC: &[u8; 4] = b"glTF";

/// Loader backed by the `gltf` crate. Decoding runs on the polling thread.
#[derive(Debug, Clone, Default)]
pub struct GltfLoader;

impl GltfLoader {
    pub fn new() -> Self {
        Self
    }
}

impl AssetLoader for GltfLoader {
    fn load_from_location(&mut self, location: &AssetLocation) -> LoadFuture {
        let location = location.clone();
        Box::pin(async move {
            let bytes = std::fs::read(location.path()).map_err(|e| ViewerError::FetchFailure {
                location: location.to_string(),
                reason: e.to_string(),
            })?;
            log::debug!("Fetched {} ({} bytes)", location, bytes.len());
            decode_glb(&bytes)
        })
    }

    fn decode_bytes(&mut self, bytes: Arc<[u8]>) -> LoadFuture {
        Box::pin(async move { decode_glb(&bytes) })
    }
}

/// Decode a GLB payload into a scene fragment.
///
/// Every triangle primitive reachable from the default scene becomes one
/// [`MeshData`] with its node transforms flattened in.
pub fn decode_glb(bytes: &[u8]) -> Result<SceneFragment, ViewerError> {
    if bytes.len() < 12 || &bytes[..4] != GLB_MAGIC {
        return Err(ViewerError::DecodeFailure(
            "not a binary glTF container".to_string(),
        ));
    }

    let (document, buffers, _images) = gltf::import_slice(bytes)?;

    let mut meshes = Vec::new();
    let scene = document.default_scene().or_else(|| document.scenes().next());
    match &scene {
        Some(scene) => collect_nodes(scene.nodes(), &buffers, &mut meshes)?,
        None => {
            for mesh in document.meshes() {
                collect_mesh(&mesh, None, Mat4::IDENTITY, &buffers, &mut meshes)?;
            }
        }
    }

    let name = scene
        .as_ref()
        .and_then(|s| s.name())
        .map(str::to_string)
        .or_else(|| meshes.first().map(|m| m.name.clone()))
        .unwrap_or_else(|| "model".to_string());

    log::debug!("Decoded '{}': {} meshes", name, meshes.len());
    Ok(SceneFragment::new(name, meshes))
}

/// Flatten the node trees under `roots` depth first.
///
/// Uses an explicit stack; a node reached twice means the hierarchy is not a
/// set of disjoint trees and the file is rejected.
fn collect_nodes<'a>(
    roots: impl Iterator<Item = gltf::Node<'a>>,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) -> Result<(), ViewerError> {
    let mut visited = HashSet::new();
    let mut stack: Vec<(gltf::Node<'a>, Mat4)> = roots.map(|node| (node, Mat4::IDENTITY)).collect();
    stack.reverse();

    while let Some((node, parent)) = stack.pop() {
        if !visited.insert(node.index()) {
            return Err(ViewerError::DecodeFailure(format!(
                "node hierarchy contains a cycle (node {})",
                node.index()
            )));
        }

        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            collect_mesh(&mesh, node.name(), world, buffers, out)?;
        }
        let first_child = stack.len();
        stack.extend(node.children().map(|child| (child, world)));
        stack[first_child..].reverse();
    }
    Ok(())
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    node_name: Option<&str>,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshData>,
) -> Result<(), ViewerError> {
    let base_name = mesh
        .name()
        .or(node_name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("mesh{}", mesh.index()));
    let primitive_count = mesh.primitives().count();

    for (i, primitive) in mesh.primitives().enumerate() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping {:?} primitive in '{}'", primitive.mode(), base_name);
            continue;
        }
        let name = if primitive_count > 1 {
            format!("{}.{}", base_name, i)
        } else {
            base_name.clone()
        };
        out.push(read_primitive(&primitive, name, transform, buffers)?);
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive,
    name: String,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshData, ViewerError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| ViewerError::DecodeFailure(format!("'{}' has no positions", name)))?
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(ViewerError::DecodeFailure(format!(
            "'{}' index {} out of range ({} vertices)",
            name,
            bad,
            positions.len()
        )));
    }

    let normals = match reader.read_normals() {
        Some(normals) => {
            let normals: Vec<[f32; 3]> = normals.collect();
            if normals.len() == positions.len() {
                normals
            } else {
                compute_normals(&positions, &indices)
            }
        }
        None => compute_normals(&positions, &indices),
    };

    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|uvs| uvs.into_f32().collect())
        .unwrap_or_default();

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, position)| Vertex3D {
            position: *position,
            normal: normals[i],
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect();

    Ok(MeshData {
        name,
        vertices,
        indices,
        transform,
        base_color: primitive.material().pbr_metallic_roughness().base_color_factor(),
    })
}

/// Area-weighted smooth vertex normals
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (pa, pb, pc) = (
            Vec3::from(positions[a]),
            Vec3::from(positions[b]),
            Vec3::from(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or_zero().to_array())
        .collect()
}
