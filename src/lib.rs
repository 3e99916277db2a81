//! orbit-viewer library
//!
//! The viewer lifecycle lives in [`viewer`]; [`app`] hosts it in an eframe
//! window. Everything runs on the UI thread.

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod gpu;
pub mod loader;
pub mod scene;
pub mod viewer;
pub mod viewport;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use error::{ErrorKind, ViewerError};
pub use viewer::{SurfaceSize, ViewerController};
