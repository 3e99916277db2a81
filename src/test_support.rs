//! Doubles and fixtures shared by the unit tests

use std::cell::RefCell;
use std::future::Future;
use std::pin::{pin, Pin};
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use glam::Mat4;

use crate::config::RendererOptions;
use crate::error::ViewerError;
use crate::gpu::Renderer;
use crate::loader::{decode_glb, AssetLoader, AssetLocation, LoadFuture};
use crate::scene::{MeshData, SceneFragment, SceneGraph, Vertex3D};
use crate::viewer::render_loop::LoopRegistry;
use crate::viewer::{FrameHandle, FrameScheduler, RenderSurface};
use crate::viewport::PerspectiveCamera;

/// Drive a future that never waits on anything external
pub fn block_on<F: Future>(future: F) -> F::Output {
    let mut future = pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    for _ in 0..1000 {
        if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
            return output;
        }
    }
    panic!("future did not complete");
}

/// Single-triangle fragment named `name`
pub fn fragment(name: &str) -> SceneFragment {
    let vertex = |position: [f32; 3]| Vertex3D { position, normal: [0.0, 0.0, 1.0], uv: [0.0, 0.0] };
    SceneFragment::new(
        name,
        vec![MeshData {
            name: name.to_string(),
            vertices: vec![
                vertex([0.0, 0.0, 0.0]),
                vertex([1.0, 0.0, 0.0]),
                vertex([0.0, 1.0, 0.0]),
            ],
            indices: vec![0, 1, 2],
            transform: Mat4::IDENTITY,
            base_color: [1.0; 4],
        }],
    )
}

/// Binary glTF fixtures
pub mod glb {
    use serde_json::{json, Value};

    const JSON_CHUNK: u32 = 0x4E4F534A;
    const BIN_CHUNK: u32 = 0x004E4942;

    const POSITIONS_LEN: usize = 3 * 3 * 4;
    const INDICES_LEN: usize = 3 * 2;

    /// One node with a one-triangle mesh in the XY plane
    pub fn single_mesh(name: &str) -> Vec<u8> {
        from_json_with_bin(&single_mesh_json(name), &single_mesh_bin())
    }

    pub fn single_mesh_at(name: &str, translation: [f32; 3]) -> Vec<u8> {
        let mut root = single_mesh_json(name);
        root["nodes"][0]["translation"] = json!(translation);
        from_json_with_bin(&root, &single_mesh_bin())
    }

    /// Glb with a JSON chunk only
    pub fn from_json(root: &Value) -> Vec<u8> {
        assemble(&serde_json::to_vec(root).unwrap(), None)
    }

    pub fn from_json_with_bin(root: &Value, bin: &[u8]) -> Vec<u8> {
        assemble(&serde_json::to_vec(root).unwrap(), Some(bin))
    }

    /// Document for [`single_mesh_bin`]: triangle positions then u16 indices
    pub fn single_mesh_json(name: &str) -> Value {
        json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0, "name": name }],
            "meshes": [{
                "name": name,
                "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }]
            }],
            "accessors": [
                {
                    "bufferView": 0,
                    "componentType": 5126,
                    "count": 3,
                    "type": "VEC3",
                    "min": [0.0, 0.0, 0.0],
                    "max": [1.0, 1.0, 0.0]
                },
                { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
            ],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": POSITIONS_LEN, "target": 34962 },
                { "buffer": 0, "byteOffset": POSITIONS_LEN, "byteLength": INDICES_LEN, "target": 34963 }
            ],
            "buffers": [{ "byteLength": POSITIONS_LEN + INDICES_LEN }]
        })
    }

    pub fn single_mesh_bin() -> Vec<u8> {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let indices: [u16; 3] = [0, 1, 2];

        let mut bin = Vec::with_capacity(POSITIONS_LEN + INDICES_LEN);
        for p in positions.iter().flatten() {
            bin.extend_from_slice(&p.to_le_bytes());
        }
        for i in indices {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        bin
    }

    fn assemble(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
        let json_padding = (4 - json.len() % 4) % 4;
        let json_len = json.len() + json_padding;
        let bin_chunk = bin.map(|bin| (bin, (4 - bin.len() % 4) % 4));
        let bin_total = bin_chunk.map_or(0, |(bin, padding)| 8 + bin.len() + padding);
        let total = 12 + 8 + json_len + bin_total;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());

        out.extend_from_slice(&(json_len as u32).to_le_bytes());
        out.extend_from_slice(&JSON_CHUNK.to_le_bytes());
        out.extend_from_slice(json);
        out.extend(std::iter::repeat(b' ').take(json_padding));

        if let Some((bin, padding)) = bin_chunk {
            out.extend_from_slice(&((bin.len() + padding) as u32).to_le_bytes());
            out.extend_from_slice(&BIN_CHUNK.to_le_bytes());
            out.extend_from_slice(bin);
            out.extend(std::iter::repeat(0u8).take(padding));
        }
        out
    }
}

/// What a [`RecordingRenderer`] has been asked to do
#[derive(Debug, Default)]
pub struct RendererLog {
    pub created: usize,
    pub renders: usize,
    pub disposed: usize,
    pub size: (f32, f32),
    pub pixel_ratio: f32,
    /// Camera aspect seen by the last render
    pub last_aspect: Option<f32>,
    pub last_projection: Option<Mat4>,
    pub last_scene_nodes: usize,
    pub renders_after_dispose: usize,
}

pub struct RecordingRenderer {
    log: Rc<RefCell<RendererLog>>,
}

impl Renderer for RecordingRenderer {
    fn set_size(&mut self, width: f32, height: f32) {
        self.log.borrow_mut().size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.log.borrow_mut().pixel_ratio = ratio;
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
        let mut log = self.log.borrow_mut();
        if log.disposed > 0 {
            log.renders_after_dispose += 1;
        }
        log.renders += 1;
        log.last_aspect = Some(camera.aspect);
        log.last_projection = Some(camera.projection_matrix());
        log.last_scene_nodes = scene.len();
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed += 1;
    }
}

/// Surface whose renderers report into a shared [`RendererLog`]
pub struct TestSurface {
    pub log: Rc<RefCell<RendererLog>>,
    pub pixel_ratio: f32,
    pub unavailable: bool,
}

impl TestSurface {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(RendererLog::default())),
            pixel_ratio: 1.0,
            unavailable: false,
        }
    }
}

impl RenderSurface for TestSurface {
    type Renderer = RecordingRenderer;

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn create_renderer(&mut self, _options: RendererOptions) -> Result<RecordingRenderer, ViewerError> {
        if self.unavailable {
            return Err(ViewerError::RendererUnavailable("test surface".into()));
        }
        self.log.borrow_mut().created += 1;
        Ok(RecordingRenderer { log: self.log.clone() })
    }
}

#[derive(Debug, Default)]
struct ManualFrames {
    loops: LoopRegistry,
    requested: usize,
}

/// Scheduler that only counts frame requests; tests call `frame` themselves
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualFrames>>,
}

impl ManualScheduler {
    pub fn requested(&self) -> usize {
        self.inner.borrow().requested
    }

    pub fn active(&self) -> usize {
        self.inner.borrow().loops.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.requested += 1;
        inner.loops.issue()
    }

    fn request_frame(&mut self, handle: &FrameHandle) {
        let mut inner = self.inner.borrow_mut();
        if inner.loops.contains(handle) {
            inner.requested += 1;
        }
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.inner.borrow_mut().loops.remove(handle);
    }

    fn is_active(&self, handle: &FrameHandle) -> bool {
        self.inner.borrow().loops.contains(handle)
    }

    fn active_loops(&self) -> usize {
        self.inner.borrow().loops.len()
    }
}

type Slot = Rc<RefCell<Option<Result<SceneFragment, ViewerError>>>>;

/// Future completed by filling its slot from the test
struct Deferred(Slot);

impl Future for Deferred {
    type Output = Result<SceneFragment, ViewerError>;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.0.borrow_mut().take() {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}

#[derive(Default)]
struct Script {
    locations: Vec<(String, Slot)>,
    decodes: Vec<Slot>,
    defer_decodes: bool,
}

/// Loader whose location fetches stay pending until the test resolves them.
///
/// Byte decodes go through the real glTF decoder unless `deferred_decodes`
/// was used, in which case they wait like fetches.
#[derive(Clone, Default)]
pub struct ScriptedLoader {
    script: Rc<RefCell<Script>>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deferred_decodes() -> Self {
        let loader = Self::default();
        loader.script.borrow_mut().defer_decodes = true;
        loader
    }

    pub fn requested_locations(&self) -> Vec<String> {
        self.script.borrow().locations.iter().map(|(l, _)| l.clone()).collect()
    }

    /// Complete the oldest location fetch that has no result yet
    pub fn resolve_location(&self, result: Result<SceneFragment, ViewerError>) {
        Self::fill(self.script.borrow().locations.iter().map(|(_, s)| s), result);
    }

    /// Complete the oldest deferred decode that has no result yet
    pub fn resolve_decode(&self, result: Result<SceneFragment, ViewerError>) {
        Self::fill(self.script.borrow().decodes.iter(), result);
    }

    pub fn pending_decodes(&self) -> usize {
        self.script.borrow().decodes.len()
    }

    fn fill<'a>(mut slots: impl Iterator<Item = &'a Slot>, result: Result<SceneFragment, ViewerError>) {
        // Outstanding requests are the slots a live future still shares
        let slot = slots
            .find(|s| s.borrow().is_none() && Rc::strong_count(s) > 1)
            .expect("no outstanding request to resolve");
        *slot.borrow_mut() = Some(result);
    }

    fn deferred(slot: &Slot) -> LoadFuture {
        Box::pin(Deferred(slot.clone()))
    }
}

impl AssetLoader for ScriptedLoader {
    fn load_from_location(&mut self, location: &AssetLocation) -> LoadFuture {
        let slot: Slot = Rc::default();
        let future = Self::deferred(&slot);
        self.script.borrow_mut().locations.push((location.as_str().to_string(), slot));
        future
    }

    fn decode_bytes(&mut self, bytes: Arc<[u8]>) -> LoadFuture {
        if !self.script.borrow().defer_decodes {
            return Box::pin(async move { decode_glb(&bytes) });
        }
        let slot: Slot = Rc::default();
        let future = Self::deferred(&slot);
        self.script.borrow_mut().decodes.push(slot);
        future
    }
}
