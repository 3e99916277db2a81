//! Camera and orbit controls for the 3D viewport
//!
//! The camera is a plain perspective projection; [`OrbitControls`] is the only
//! thing that moves it, either from pointer input or from auto-rotation.

pub mod camera;
pub mod controls;

// Re-export commonly used types
pub use camera::PerspectiveCamera;
pub use controls::{ControlsState, InteractionKind, OrbitControls};
