//! Live viewer state and in-flight loads

use glam::Vec3;
use std::fmt;
use std::task::{Context, Poll};

use super::drop::ReadFuture;
use super::events::{HostEvent, Subscription};
use super::render_loop::FrameHandle;
use super::surface::SurfaceSize;
use crate::error::{ErrorKind, ViewerError};
use crate::loader::{AssetLoader, LoadFuture};
use crate::scene::{HemisphereLight, SceneFragment, SceneGraph};
use crate::viewport::{OrbitControls, PerspectiveCamera};

/// Everything that exists while a viewer is mounted.
///
/// Owned by the controller; dropped as a whole on teardown, which also
/// releases the host subscriptions it holds.
pub struct ViewerState<R> {
    /// Mount generation this state belongs to
    pub mount: u64,
    pub surface: SurfaceSize,
    pub pixel_ratio: f32,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub renderer: R,
    pub scene: SceneGraph,
    pub light: HemisphereLight,
    /// Present while the render loop is running
    pub frame_handle: Option<FrameHandle>,
    pub current_asset: Option<String>,
    /// A dropped asset has been applied during this mount
    pub replaced: bool,
    pub(crate) subscriptions: Vec<Subscription>,
}

impl<R> ViewerState<R> {
    pub fn loop_running(&self) -> bool {
        self.frame_handle.is_some()
    }

    /// Host events this mount is subscribed to
    pub fn subscribed_events(&self) -> Vec<HostEvent> {
        self.subscriptions.iter().map(Subscription::event).collect()
    }

    /// Swap in a dropped asset.
    ///
    /// Clears the scene, re-adds the light, stops auto-rotation, homes the
    /// camera and inserts `fragment`. Runs to completion under one `&mut`
    /// borrow so no frame can be drawn in between.
    pub fn apply_replacement(&mut self, name: &str, fragment: SceneFragment, home: Vec3) {
        self.scene.replace_contents(self.light, fragment);
        self.controls.auto_rotate = false;
        self.controls.reset();
        self.camera.position = home;
        self.camera.look_at(Vec3::ZERO);
        self.current_asset = Some(name.to_string());
        self.replaced = true;
    }
}

impl<R> fmt::Debug for ViewerState<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerState")
            .field("mount", &self.mount)
            .field("surface", &self.surface)
            .field("camera", &self.camera)
            .field("scene_nodes", &self.scene.len())
            .field("loop_running", &self.loop_running())
            .field("subscriptions", &self.subscribed_events())
            .field("current_asset", &self.current_asset)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub(crate) u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    /// Bundled asset requested during initialization
    Default { location: String },
    /// User-dropped file
    Drop { name: String },
}

impl LoadOrigin {
    pub fn label(&self) -> &str {
        match self {
            LoadOrigin::Default { location } => location,
            LoadOrigin::Drop { name } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The mount that issued the load is gone
    Unmounted,
    /// A dropped asset was applied before the default asset arrived
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { ticket: LoadTicket, asset: String },
    Failed { ticket: LoadTicket, kind: ErrorKind },
    Discarded { ticket: LoadTicket, reason: DiscardReason },
}

impl LoadOutcome {
    pub fn ticket(&self) -> LoadTicket {
        match self {
            LoadOutcome::Applied { ticket, .. }
            | LoadOutcome::Failed { ticket, .. }
            | LoadOutcome::Discarded { ticket, .. } => *ticket,
        }
    }
}

enum LoadStage {
    Reading(ReadFuture),
    Decoding(LoadFuture),
}

/// One outstanding asset request
pub struct PendingLoad {
    pub ticket: LoadTicket,
    pub mount: u64,
    pub origin: LoadOrigin,
    stage: LoadStage,
}

impl PendingLoad {
    pub(crate) fn reading(ticket: LoadTicket, mount: u64, origin: LoadOrigin, read: ReadFuture) -> Self {
        Self { ticket, mount, origin, stage: LoadStage::Reading(read) }
    }

    pub(crate) fn decoding(ticket: LoadTicket, mount: u64, origin: LoadOrigin, decode: LoadFuture) -> Self {
        Self { ticket, mount, origin, stage: LoadStage::Decoding(decode) }
    }

    pub fn is_reading(&self) -> bool {
        matches!(self.stage, LoadStage::Reading(_))
    }

    /// Advance the load; a finished read hands its bytes to `loader` and
    /// continues with the decode in the same poll.
    pub(crate) fn poll(
        &mut self,
        cx: &mut Context<'_>,
        loader: &mut dyn AssetLoader,
    ) -> Poll<Result<SceneFragment, ViewerError>> {
        loop {
            match &mut self.stage {
                LoadStage::Reading(read) => match read.as_mut().poll(cx) {
                    Poll::Ready(Ok(bytes)) => {
                        log::debug!("Read '{}' ({} bytes)", self.origin.label(), bytes.len());
                        self.stage = LoadStage::Decoding(loader.decode_bytes(bytes));
                    }
                    Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                    Poll::Pending => return Poll::Pending,
                },
                LoadStage::Decoding(decode) => return decode.as_mut().poll(cx),
            }
        }
    }
}

impl fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .field("mount", &self.mount)
            .field("origin", &self.origin)
            .field("reading", &self.is_reading())
            .finish()
    }
}

/// User-facing message queued for the host to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerNotice {
    pub kind: ErrorKind,
    pub message: String,
}
