mod app;
mod ui;

use app::ZimcareApp;
use eframe::egui;
use zimcare::config::AppConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Zimcare – Health Facility Directory",
        options,
        Box::new(|cc| Ok(Box::new(ZimcareApp::new(cc, config)))),
    )
}
