//! Error taxonomy for the viewer
//!
//! Every fallible viewer operation returns [`ViewerError`]. [`ErrorKind`] is the
//! coarse classification the app uses to decide how a failure is surfaced.

use std::io;

/// Coarse failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong or missing dropped file
    UnsupportedAsset,
    /// Dropped file could not be read
    ReadFailure,
    /// Payload is not a decodable binary glTF
    DecodeFailure,
    /// Default asset could not be fetched
    FetchFailure,
    /// No wgpu render state available for the surface
    RendererUnavailable,
    /// Operation issued while no viewer is mounted
    NotMounted,
    /// Config file unreadable or malformed
    Config,
}

impl ErrorKind {
    /// Whether the failure is shown to the user rather than only logged
    pub fn is_user_facing(self) -> bool {
        matches!(
            self,
            ErrorKind::UnsupportedAsset | ErrorKind::ReadFailure | ErrorKind::DecodeFailure
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("No file was dropped")]
    NoFile,

    #[error("Unsupported file '{name}': please drop a .glb file")]
    UnsupportedAsset { name: String },

    #[error("Failed to read '{name}': {source}")]
    ReadFailure {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode model: {0}")]
    DecodeFailure(String),

    #[error("Failed to fetch '{location}': {reason}")]
    FetchFailure { location: String, reason: String },

    #[error("Renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("Viewer is not mounted")]
    NotMounted,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ViewerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ViewerError::NoFile | ViewerError::UnsupportedAsset { .. } => ErrorKind::UnsupportedAsset,
            ViewerError::ReadFailure { .. } => ErrorKind::ReadFailure,
            ViewerError::DecodeFailure(_) => ErrorKind::DecodeFailure,
            ViewerError::FetchFailure { .. } => ErrorKind::FetchFailure,
            ViewerError::RendererUnavailable(_) => ErrorKind::RendererUnavailable,
            ViewerError::NotMounted => ErrorKind::NotMounted,
            ViewerError::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<gltf::Error> for ViewerError {
    fn from(err: gltf::Error) -> Self {
        ViewerError::DecodeFailure(err.to_string())
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(ViewerError::NoFile.kind(), ErrorKind::UnsupportedAsset);
        let err = ViewerError::UnsupportedAsset { name: "notes.txt".into() };
        assert_eq!(err.kind(), ErrorKind::UnsupportedAsset);
        assert!(err.to_string().contains("notes.txt"));

        let err = ViewerError::ReadFailure {
            name: "rock.glb".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.kind(), ErrorKind::ReadFailure);
        assert!(err.kind().is_user_facing());

        let err = ViewerError::FetchFailure { location: "assets/planet.glb".into(), reason: "missing".into() };
        assert!(!err.kind().is_user_facing());
    }
}
