//! Dropped-file validation and reading
//!
//! Only the first dropped file is considered. Validation is synchronous so a
//! rejected drop never touches viewer state; reading the contents is a
//! suspension point like decoding.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ViewerError;

/// Pending read of a dropped file's contents
pub type ReadFuture = Pin<Box<dyn Future<Output = Result<Arc<[u8]>, ViewerError>>>>;

#[derive(Debug, Clone)]
pub enum DroppedSource {
    /// Contents delivered with the drop event
    Bytes(Arc<[u8]>),
    /// File on disk, read when the load is first polled
    Path(PathBuf),
    /// Drop event carried a name but no readable contents
    Missing,
}

#[derive(Debug, Clone)]
pub struct DroppedAsset {
    pub name: String,
    pub source: DroppedSource,
}

impl DroppedAsset {
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            source: DroppedSource::Bytes(bytes.into()),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            source: DroppedSource::Path(path),
        }
    }

    /// Convert an egui drop. Native drops carry a path, web drops carry bytes.
    pub fn from_egui(file: &egui::DroppedFile) -> Self {
        if let Some(bytes) = &file.bytes {
            return Self::from_bytes(file.name.clone(), bytes.clone());
        }
        match &file.path {
            Some(path) => {
                let mut asset = Self::from_path(path.clone());
                if !file.name.is_empty() {
                    asset.name = file.name.clone();
                }
                asset
            }
            None => Self {
                name: file.name.clone(),
                source: DroppedSource::Missing,
            },
        }
    }

    /// Read the full contents into memory
    pub fn read(self) -> ReadFuture {
        Box::pin(async move {
            match self.source {
                DroppedSource::Bytes(bytes) => Ok(bytes),
                DroppedSource::Path(path) => std::fs::read(&path)
                    .map(Arc::<[u8]>::from)
                    .map_err(|source| ViewerError::ReadFailure { name: self.name, source }),
                DroppedSource::Missing => Err(ViewerError::ReadFailure {
                    name: self.name,
                    source: io::Error::new(io::ErrorKind::NotFound, "drop carried no file contents"),
                }),
            }
        })
    }
}

/// Pick the first dropped file and check its name ends with `extension`
pub fn validate_drop<'a>(
    files: &'a [DroppedAsset],
    extension: &str,
) -> Result<&'a DroppedAsset, ViewerError> {
    let first = files.first().ok_or(ViewerError::NoFile)?;
    if !first.name.ends_with(extension) {
        return Err(ViewerError::UnsupportedAsset { name: first.name.clone() });
    }
    Ok(first)
}
