mod app;
mod color;
mod config;
mod data;
mod format;
mod state;
mod ui;

use app::CinescopeApp;
use config::Config;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::from_env();
    log::info!("Starting with data source {}", config.source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cinescope – Movie Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(CinescopeApp::new(config)))),
    )
}
