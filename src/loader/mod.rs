//! Asset loading
//!
//! The controller only talks to the [`AssetLoader`] trait. Both operations are
//! asynchronous: they hand back a [`LoadFuture`] that the controller polls on
//! the UI thread until the decoded [`SceneFragment`] is ready.

pub mod gltf;

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ViewerError;
use crate::scene::SceneFragment;

pub use self::gltf::{decode_glb, GltfLoader};

/// Pending decode result, polled on the UI thread
pub type LoadFuture = Pin<Box<dyn Future<Output = Result<SceneFragment, ViewerError>>>>;

pub trait AssetLoader {
    /// Fetch and decode the asset at `location`.
    ///
    /// Fails with `FetchFailure` when the payload can't be retrieved and
    /// `DecodeFailure` when it isn't a valid binary glTF.
    fn load_from_location(&mut self, location: &AssetLocation) -> LoadFuture;

    /// Decode an in-memory payload. No I/O; fails only with `DecodeFailure`.
    fn decode_bytes(&mut self, bytes: Arc<[u8]>) -> LoadFuture;
}

/// Resolved location of a bundled asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetLocation {
    raw: String,
    path: PathBuf,
}

impl AssetLocation {
    /// Resolve `raw` against `base`. Accepts plain paths and `file://` URLs.
    pub fn resolve(raw: &str, base: &Path) -> Result<Self, ViewerError> {
        let local = match raw.split_once("://") {
            None => raw,
            Some(("file", rest)) => rest,
            Some((scheme, _)) => {
                return Err(ViewerError::FetchFailure {
                    location: raw.to_string(),
                    reason: format!("unsupported scheme '{}'", scheme),
                });
            }
        };

        let path = Path::new(local);
        let path = if path.is_absolute() { path.to_path_buf() } else { base.join(path) };
        Ok(Self { raw: raw.to_string(), path })
    }

    /// Directory the viewer is deployed from: the executable's directory,
    /// else the working directory
    pub fn deployment_base() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
