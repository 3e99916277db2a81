//! orbit-viewer - interactive single-model glTF viewer
//!
//! Shows the bundled default model with orbit controls; drop a `.glb` file on
//! the window to view it instead. An optional first argument replaces the
//! default model path.

use eframe::egui;
use orbit_viewer::app::ViewerApp;
use orbit_viewer::config::ViewerConfig;
use orbit_viewer::constants;
use orbit_viewer::gpu::config::{sample_count, DEPTH_BUFFER_BITS};

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = ViewerConfig::load();
    if let Some(asset) = std::env::args().nth(1) {
        log::info!("Default asset overridden from command line: {}", asset);
        config.default_asset = asset;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(constants::APP_NAME)
            .with_inner_size(constants::ui::DEFAULT_WINDOW_SIZE)
            .with_drag_and_drop(true)
            .with_transparent(config.renderer.transparent),
        renderer: eframe::Renderer::Wgpu,
        depth_buffer: DEPTH_BUFFER_BITS,
        multisampling: sample_count(config.renderer) as u16,
        ..Default::default()
    };

    eframe::run_native(
        constants::APP_NAME,
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(cc, config)))),
    )
}
