//! Desktop shell hosting the viewer
//!
//! [`ViewerApp`] is the eframe application: it mounts one
//! [`ViewerController`] into the central panel on the first frame and routes
//! window signals to it. Pointer drags orbit (primary) or pan (secondary),
//! the wheel dollies, and files dropped onto the viewer go through the
//! drop-replace protocol.

use std::collections::VecDeque;

use egui::{Align2, Color32, FontId, PointerButton, Pos2, Rect, RichText, Stroke, Vec2};

use crate::config::{RendererOptions, ViewerConfig};
use crate::constants;
use crate::error::{ErrorKind, ViewerError};
use crate::gpu::WgpuRenderer;
use crate::loader::GltfLoader;
use crate::viewer::{
    DroppedAsset, EguiFrameScheduler, HostEvent, RenderSurface, SurfaceSize, ViewerController,
    ViewerNotice,
};
use crate::viewport::InteractionKind;

/// eframe window as a render surface
pub struct EguiSurface {
    ctx: egui::Context,
    render_state: Option<egui_wgpu::RenderState>,
}

impl EguiSurface {
    pub fn new(ctx: egui::Context, render_state: Option<egui_wgpu::RenderState>) -> Self {
        Self { ctx, render_state }
    }
}

impl RenderSurface for EguiSurface {
    type Renderer = WgpuRenderer;

    fn device_pixel_ratio(&self) -> f32 {
        self.ctx.pixels_per_point()
    }

    fn create_renderer(&mut self, options: RendererOptions) -> Result<WgpuRenderer, ViewerError> {
        let render_state = self.render_state.as_ref().ok_or_else(|| {
            ViewerError::RendererUnavailable("eframe is not running the wgpu backend".into())
        })?;
        Ok(WgpuRenderer::new(render_state, options))
    }
}

pub struct ViewerApp {
    viewer: ViewerController<EguiSurface, GltfLoader>,
    mount_attempted: bool,
    mount_error: Option<String>,
    /// Viewer rect size and pixels-per-point last reported to the controller
    last_layout: Option<(Vec2, f32)>,
    notices: VecDeque<ViewerNotice>,
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Self {
        let surface = EguiSurface::new(cc.egui_ctx.clone(), cc.wgpu_render_state.clone());
        let scheduler = Box::new(EguiFrameScheduler::new(cc.egui_ctx.clone()));
        let viewer = ViewerController::new(config, surface, GltfLoader::new(), scheduler);

        Self {
            viewer,
            mount_attempted: false,
            mount_error: None,
            last_layout: None,
            notices: VecDeque::new(),
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("3D viewer");
                ui.separator();
                if ui.button("Open…").clicked() {
                    self.open_file_dialog();
                }
                ui.label(RichText::new("Drag glb file to view it").weak());
            });
        });
    }

    fn show_status(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let asset = self.viewer.current_asset().unwrap_or("no model loaded");
                ui.label(format!("Showing: {}", asset));
                let pending = self.viewer.pending_loads().len();
                if pending > 0 {
                    ui.separator();
                    ui.spinner();
                    ui.label(format!("Loading {} file(s)", pending));
                }
            });
        });
    }

    fn show_viewer(&mut self, ui: &mut egui::Ui) {
        let size = ui
            .available_size()
            .max(Vec2::splat(constants::ui::MIN_VIEWER_SIZE));
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
        let dims = SurfaceSize::new(rect.width(), rect.height());
        let layout = (rect.size(), ui.ctx().pixels_per_point());

        if !self.mount_attempted {
            self.mount_attempted = true;
            self.last_layout = Some(layout);
            if let Err(e) = self.viewer.initialize(dims) {
                log::error!("Failed to start viewer: {}", e);
                self.mount_error = Some(e.to_string());
            }
        } else if self.viewer.events().is_subscribed(HostEvent::Resize)
            && self.last_layout != Some(layout)
        {
            self.last_layout = Some(layout);
            self.viewer.handle_resize(dims);
        }

        self.handle_pointer(ui, &response);
        self.handle_dropped_files(ui.ctx(), rect);

        let dt = ui.input(|i| i.stable_dt).min(0.1);
        if self.viewer.frame(dt) {
            if let Some(callback) = self.viewer.renderer_mut().and_then(WgpuRenderer::take_frame) {
                ui.painter()
                    .add(egui_wgpu::Callback::new_paint_callback(rect, callback));
            }
        }

        let hovering_files = ui.input(|i| !i.raw.hovered_files.is_empty());
        if hovering_files {
            let painter = ui.painter();
            painter.rect_filled(rect, constants::ui::DEFAULT_FRAME_ROUNDING, Color32::from_black_alpha(96));
            painter.rect_stroke(
                rect.shrink(constants::ui::DEFAULT_FRAME_MARGIN),
                constants::ui::DEFAULT_FRAME_ROUNDING,
                Stroke::new(2.0, Color32::LIGHT_BLUE),
                egui::StrokeKind::Inside,
            );
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Drop to view",
                FontId::proportional(20.0),
                Color32::WHITE,
            );
        }

        if let Some(error) = &self.mount_error {
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                error,
                FontId::proportional(14.0),
                Color32::LIGHT_RED,
            );
        }
    }

    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response) {
        if response.drag_started_by(PointerButton::Primary) {
            self.viewer.begin_interaction(InteractionKind::Rotate);
        } else if response.drag_started_by(PointerButton::Secondary)
            || response.drag_started_by(PointerButton::Middle)
        {
            self.viewer.begin_interaction(InteractionKind::Pan);
        }

        if response.dragged() {
            let delta = response.drag_delta();
            match self.viewer.controls().map(|c| c.interaction()) {
                Some(InteractionKind::Rotate) => self.viewer.orbit(delta.x, delta.y),
                Some(InteractionKind::Pan) => self.viewer.pan(delta.x, delta.y),
                _ => {}
            }
        }

        if response.drag_stopped() {
            self.viewer.end_interaction();
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.viewer.dolly(scroll / constants::controls::SCROLL_STEP);
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context, rect: Rect) {
        let (dropped, pointer) = ctx.input(|i| (i.raw.dropped_files.clone(), i.pointer.hover_pos()));
        if dropped.is_empty() {
            return;
        }

        if !drop_lands_in_viewer(pointer, rect)
            && self.viewer.events().is_subscribed(HostEvent::DragSuppression)
        {
            log::debug!("Ignoring {} file(s) dropped outside the viewer", dropped.len());
            return;
        }

        let files: Vec<DroppedAsset> = dropped.iter().map(DroppedAsset::from_egui).collect();
        if let Err(e) = self.viewer.handle_drop(&files) {
            log::debug!("Drop rejected: {}", e);
        }
    }

    fn open_file_dialog(&mut self) {
        let extension = self
            .viewer
            .config()
            .accepted_extension
            .trim_start_matches('.')
            .to_string();

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("glTF binary", &[extension.as_str()])
            .pick_file()
        {
            if let Err(e) = self.viewer.handle_drop(&[DroppedAsset::from_path(path)]) {
                log::debug!("Open rejected: {}", e);
            }
        }
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        self.notices.extend(self.viewer.take_notices());
        let Some(notice) = self.notices.front() else {
            return;
        };

        let title = notice_title(notice.kind);
        let message = notice.message.clone();
        let modal = egui::Modal::new(egui::Id::new("viewer_notice")).show(ctx, |ui| {
            ui.set_width(320.0);
            ui.heading(title);
            ui.label(message);
            ui.add_space(8.0);
            ui.button("OK").clicked()
        });

        if modal.inner || modal.should_close() {
            self.notices.pop_front();
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show_header(ctx);
        self.show_status(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.show_viewer(ui));
        self.show_notice(ctx);
    }

    fn clear_color(&self, visuals: &egui::Visuals) -> [f32; 4] {
        if self.viewer.config().renderer.transparent {
            [0.0; 4]
        } else {
            visuals.panel_fill.to_normalized_gamma_f32()
        }
    }
}

/// Whether a drop belongs to the viewer.
///
/// Some platforms report no pointer position while a file drag is in
/// progress; such drops are taken as landing on the viewer, which fills the
/// central panel.
fn drop_lands_in_viewer(pointer: Option<Pos2>, rect: Rect) -> bool {
    pointer.is_none_or(|p| rect.contains(p))
}

fn notice_title(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::UnsupportedAsset => "Please drop a .glb file",
        ErrorKind::ReadFailure => "Couldn't read the file",
        ErrorKind::DecodeFailure => "Couldn't open the model",
        _ => "Viewer error",
    }
}
