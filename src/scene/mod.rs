//! Scene graph for the viewer
//!
//! The scene is an ordered list of nodes: one persistent hemisphere light plus
//! the decoded model fragments. It is replaced wholesale when a new asset is
//! dropped, never edited node by node.

pub mod fragment;
pub mod graph;
pub mod light;

pub use fragment::{MeshData, SceneFragment, Vertex3D};
pub use graph::{SceneGraph, SceneNode};
pub use light::HemisphereLight;
