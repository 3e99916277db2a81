//! Viewer lifecycle
//!
//! [`ViewerController`] owns one mounted viewer at a time: it builds the
//! camera, renderer, scene and controls on [`ViewerController::initialize`],
//! drives them once per frame, swaps in dropped models and tears everything
//! down again. All of it runs on the UI thread.
//!
//! Loads are never cancelled. Each one remembers the mount generation that
//! issued it, and a result that comes back after its mount is gone is
//! discarded without touching anything.

pub mod drop;
pub mod events;
pub mod render_loop;
pub mod state;
pub mod surface;


use std::collections::VecDeque;
use std::path::PathBuf;
use std::task::{Context, Poll, Waker};

use glam::{EulerRot, Quat, Vec3};
use once_cell::sync::Lazy;

use crate::config::ViewerConfig;
use crate::constants;
use crate::error::ViewerError;
use crate::gpu::Renderer;
use crate::loader::{AssetLoader, AssetLocation};
use crate::scene::{HemisphereLight, SceneFragment, SceneGraph};
use crate::viewport::{InteractionKind, OrbitControls, PerspectiveCamera};

pub use self::drop::{validate_drop, DroppedAsset, DroppedSource};
pub use self::events::{EventHub, HostEvent, Subscription};
pub use self::render_loop::{EguiFrameScheduler, FrameHandle, FrameScheduler};
pub use self::state::{
    DiscardReason, LoadOrigin, LoadOutcome, LoadTicket, PendingLoad, ViewerNotice, ViewerState,
};
pub use self::surface::{RenderSurface, SurfaceSize};

/// Fixed tilt applied to the bundled default asset only
pub static DEFAULT_ASSET_ROTATION: Lazy<Quat> = Lazy::new(|| {
    Quat::from_euler(
        EulerRot::XYZ,
        constants::default_asset::TILT_X,
        0.0,
        constants::default_asset::TILT_Z,
    )
});

pub struct ViewerController<S: RenderSurface, L: AssetLoader> {
    config: ViewerConfig,
    surface: S,
    loader: L,
    scheduler: Box<dyn FrameScheduler>,
    events: EventHub,
    state: Option<ViewerState<S::Renderer>>,
    pending: Vec<PendingLoad>,
    generation: u64,
    next_ticket: u64,
    notices: VecDeque<ViewerNotice>,
    asset_base: PathBuf,
}

impl<S: RenderSurface, L: AssetLoader> ViewerController<S, L> {
    pub fn new(config: ViewerConfig, surface: S, loader: L, scheduler: Box<dyn FrameScheduler>) -> Self {
        Self {
            config,
            surface,
            loader,
            scheduler,
            events: EventHub::new(),
            state: None,
            pending: Vec::new(),
            generation: 0,
            next_ticket: 0,
            notices: VecDeque::new(),
            asset_base: AssetLocation::deployment_base(),
        }
    }

    /// Directory relative default-asset locations are resolved against
    pub fn with_asset_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.asset_base = base.into();
        self
    }

    /// Mount the viewer on a surface of `dims`.
    ///
    /// Subscribes to host events, builds camera, renderer, light and controls,
    /// starts the render loop and requests the default asset. Calling it again
    /// while mounted does nothing.
    pub fn initialize(&mut self, dims: SurfaceSize) -> Result<(), ViewerError> {
        if self.state.is_some() {
            log::warn!("Viewer already initialized; ignoring second initialize");
            return Ok(());
        }

        let subscriptions = vec![
            self.events.subscribe(HostEvent::Resize),
            self.events.subscribe(HostEvent::DragSuppression),
        ];

        let camera = PerspectiveCamera::from_config(&self.config.camera, dims.aspect());

        let mut renderer = self.surface.create_renderer(self.config.renderer)?;
        let pixel_ratio = self.surface.device_pixel_ratio();
        renderer.set_size(dims.width, dims.height);
        renderer.set_pixel_ratio(pixel_ratio);

        let light = HemisphereLight::new(
            self.config.light.sky_color,
            self.config.light.ground_color,
            self.config.light.intensity,
        );
        let mut scene = SceneGraph::new();
        scene.add_light(light);

        let controls = OrbitControls::new(&self.config.controls, dims.height);

        self.generation += 1;
        let frame_handle = self.scheduler.start();

        self.state = Some(ViewerState {
            mount: self.generation,
            surface: dims,
            pixel_ratio,
            camera,
            controls,
            renderer,
            scene,
            light,
            frame_handle: Some(frame_handle),
            current_asset: None,
            replaced: false,
            subscriptions,
        });

        log::info!(
            "Viewer mounted ({}x{} @ {}x, mount {})",
            dims.width,
            dims.height,
            pixel_ratio,
            self.generation
        );

        self.request_default_asset();
        Ok(())
    }

    fn request_default_asset(&mut self) {
        let location = match AssetLocation::resolve(&self.config.default_asset, &self.asset_base) {
            Ok(location) => location,
            Err(e) => {
                self.report(&e);
                return;
            }
        };

        log::info!("Loading default asset {}", location);
        let future = self.loader.load_from_location(&location);
        let ticket = self.issue_ticket();
        self.pending.push(PendingLoad::decoding(
            ticket,
            self.generation,
            LoadOrigin::Default { location: location.to_string() },
            future,
        ));
    }

    /// Accept a drop of `files` onto the viewer.
    ///
    /// Only the first file counts. A rejected drop leaves the scene, camera
    /// and controls untouched and queues a notice. An accepted one is read
    /// and decoded over the following frames; the returned ticket identifies
    /// it in [`ViewerController::poll_loads`].
    pub fn handle_drop(&mut self, files: &[DroppedAsset]) -> Result<LoadTicket, ViewerError> {
        let Some(mount) = self.state.as_ref().map(|s| s.mount) else {
            return Err(ViewerError::NotMounted);
        };

        let asset = match validate_drop(files, &self.config.accepted_extension) {
            Ok(asset) => asset.clone(),
            Err(e) => {
                self.report(&e);
                return Err(e);
            }
        };

        log::info!("Loading dropped file '{}'", asset.name);
        let ticket = self.issue_ticket();
        let origin = LoadOrigin::Drop { name: asset.name.clone() };
        self.pending.push(PendingLoad::reading(ticket, mount, origin, asset.read()));
        Ok(ticket)
    }

    /// Advance outstanding loads and apply the ones that finished
    pub fn poll_loads(&mut self) -> Vec<LoadOutcome> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        let mut cx = Context::from_waker(Waker::noop());
        let mut outcomes = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for mut load in std::mem::take(&mut self.pending) {
            match load.poll(&mut cx, &mut self.loader) {
                Poll::Pending => still_pending.push(load),
                Poll::Ready(result) => outcomes.push(self.complete(load, result)),
            }
        }

        self.pending = still_pending;
        outcomes
    }

    fn complete(&mut self, load: PendingLoad, result: Result<SceneFragment, ViewerError>) -> LoadOutcome {
        let ticket = load.ticket;
        let live = self.state.as_ref().is_some_and(|s| s.mount == load.mount);
        if !live {
            log::debug!("Discarding '{}' from mount {}", load.origin.label(), load.mount);
            return LoadOutcome::Discarded { ticket, reason: DiscardReason::Unmounted };
        }

        let fragment = match result {
            Ok(fragment) => fragment,
            Err(e) => {
                self.report(&e);
                return LoadOutcome::Failed { ticket, kind: e.kind() };
            }
        };

        let home = Vec3::from(self.config.camera.position);
        let Some(state) = self.state.as_mut() else {
            return LoadOutcome::Discarded { ticket, reason: DiscardReason::Unmounted };
        };

        match load.origin {
            LoadOrigin::Default { location } => {
                if state.replaced {
                    log::info!("Default asset arrived after a dropped model; discarding");
                    return LoadOutcome::Discarded { ticket, reason: DiscardReason::Superseded };
                }
                let mut fragment = fragment;
                fragment.rotation = *DEFAULT_ASSET_ROTATION;
                log::info!(
                    "Default asset '{}' loaded ({} triangles)",
                    fragment.name,
                    fragment.triangle_count()
                );
                state.scene.add_fragment(fragment);
                state.current_asset = Some(location.clone());
                LoadOutcome::Applied { ticket, asset: location }
            }
            LoadOrigin::Drop { name } => {
                log::info!("Showing '{}' ({} triangles)", name, fragment.triangle_count());
                state.apply_replacement(&name, fragment, home);
                LoadOutcome::Applied { ticket, asset: name }
            }
        }
    }

    /// Run one frame: apply finished loads, advance the controls, draw and
    /// schedule the next frame. Returns `false` once the loop has stopped.
    ///
    /// Outstanding loads are polled even when unmounted so that loads from an
    /// ended mount are drained as they finish.
    pub fn frame(&mut self, dt: f32) -> bool {
        self.poll_loads();
        if !self.is_running() {
            return false;
        }

        let Some(state) = self.state.as_mut() else {
            return false;
        };
        state.controls.update(&mut state.camera, dt);
        state.renderer.render(&state.scene, &state.camera);
        if let Some(handle) = &state.frame_handle {
            self.scheduler.request_frame(handle);
        }
        true
    }

    /// Surface changed size or pixel density
    pub fn handle_resize(&mut self, dims: SurfaceSize) {
        let pixel_ratio = self.surface.device_pixel_ratio();
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.surface = dims;
        state.pixel_ratio = pixel_ratio;
        state.camera.set_aspect(dims.aspect());
        state.camera.update_projection_matrix();
        state.renderer.set_size(dims.width, dims.height);
        state.renderer.set_pixel_ratio(pixel_ratio);
        state.controls.set_element_height(dims.height);
        log::debug!("Viewer resized to {}x{} @ {}x", dims.width, dims.height, pixel_ratio);
    }

    /// Unmount: stop the loop, release the renderer and host subscriptions.
    ///
    /// Safe to call when not mounted. Loads still in flight stay queued and
    /// are discarded by the next `poll_loads` or `frame` after they finish;
    /// dropping the controller drops them unfinished.
    pub fn teardown(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        if let Some(handle) = state.frame_handle.take() {
            self.scheduler.cancel(handle);
        }
        state.renderer.dispose();
        drop(state);

        log::info!(
            "Viewer unmounted (mount {}, {} loads outstanding)",
            self.generation,
            self.pending.len()
        );
    }

    fn issue_ticket(&mut self) -> LoadTicket {
        self.next_ticket += 1;
        LoadTicket(self.next_ticket)
    }

    fn report(&mut self, error: &ViewerError) {
        let kind = error.kind();
        if kind.is_user_facing() {
            log::warn!("{}", error);
            self.notices.push_back(ViewerNotice { kind, message: error.to_string() });
        } else {
            log::error!("{}", error);
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.state.as_ref().is_some_and(ViewerState::loop_running)
    }

    pub fn state(&self) -> Option<&ViewerState<S::Renderer>> {
        self.state.as_ref()
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.state.as_ref().map(|s| &s.scene)
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.state.as_ref().map(|s| &s.camera)
    }

    pub fn controls(&self) -> Option<&OrbitControls> {
        self.state.as_ref().map(|s| &s.controls)
    }

    pub fn renderer_mut(&mut self) -> Option<&mut S::Renderer> {
        self.state.as_mut().map(|s| &mut s.renderer)
    }

    pub fn current_asset(&self) -> Option<&str> {
        self.state.as_ref().and_then(|s| s.current_asset.as_deref())
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn active_loops(&self) -> usize {
        self.scheduler.active_loops()
    }

    pub fn pending_loads(&self) -> &[PendingLoad] {
        &self.pending
    }

    /// Drain notices queued for the user
    pub fn take_notices(&mut self) -> Vec<ViewerNotice> {
        self.notices.drain(..).collect()
    }

    pub fn begin_interaction(&mut self, kind: InteractionKind) {
        if let Some(state) = self.state.as_mut() {
            state.controls.begin_interaction(kind);
        }
    }

    pub fn end_interaction(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.controls.end_interaction();
        }
    }

    /// Pointer drag in points while rotating
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        if let Some(state) = self.state.as_mut() {
            state.controls.rotate(delta_x, delta_y);
        }
    }

    /// Pointer drag in points while panning
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        if let Some(state) = self.state.as_mut() {
            state.controls.pan(delta_x, delta_y, &state.camera);
        }
    }

    pub fn dolly(&mut self, steps: f32) {
        if let Some(state) = self.state.as_mut() {
            state.controls.dolly(steps);
        }
    }
}

impl<S: RenderSurface, L: AssetLoader> Drop for ViewerController<S, L> {
    fn drop(&mut self) {
        self.teardown();
    }
}
