//! Self-rescheduling render loop
//!
//! A loop is a [`FrameHandle`] issued by a [`FrameScheduler`]. Each frame the
//! controller asks the scheduler for the next one; cancelling the handle stops
//! the rescheduling deterministically.

use std::collections::HashSet;

/// Handle of one running render loop. Not `Clone`: cancelling consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait FrameScheduler {
    /// Start a new loop and schedule its first frame
    fn start(&mut self) -> FrameHandle;

    /// Schedule the next frame of a live loop; ignored for cancelled handles
    fn request_frame(&mut self, handle: &FrameHandle);

    fn cancel(&mut self, handle: FrameHandle);

    fn is_active(&self, handle: &FrameHandle) -> bool;

    fn active_loops(&self) -> usize;
}

/// Loop ids issued and not yet cancelled
#[derive(Debug, Default)]
pub struct LoopRegistry {
    next_id: u64,
    active: HashSet<u64>,
}

impl LoopRegistry {
    pub fn issue(&mut self) -> FrameHandle {
        self.next_id += 1;
        self.active.insert(self.next_id);
        FrameHandle(self.next_id)
    }

    pub fn contains(&self, handle: &FrameHandle) -> bool {
        self.active.contains(&handle.0)
    }

    pub fn remove(&mut self, handle: FrameHandle) -> bool {
        self.active.remove(&handle.0)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Drives frames through egui's repaint requests
pub struct EguiFrameScheduler {
    ctx: egui::Context,
    loops: LoopRegistry,
}

impl EguiFrameScheduler {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx, loops: LoopRegistry::default() }
    }
}

impl FrameScheduler for EguiFrameScheduler {
    fn start(&mut self) -> FrameHandle {
        let handle = self.loops.issue();
        log::debug!("Render loop {} started", handle.id());
        self.ctx.request_repaint();
        handle
    }

    fn request_frame(&mut self, handle: &FrameHandle) {
        if self.loops.contains(handle) {
            self.ctx.request_repaint();
        }
    }

    fn cancel(&mut self, handle: FrameHandle) {
        let id = handle.id();
        if self.loops.remove(handle) {
            log::debug!("Render loop {} stopped", id);
        }
    }

    fn is_active(&self, handle: &FrameHandle) -> bool {
        self.loops.contains(handle)
    }

    fn active_loops(&self) -> usize {
        self.loops.len()
    }
}
