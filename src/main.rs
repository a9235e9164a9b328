mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::DtiViewerApp;
use eframe::egui;

/// Fixed default dataset locations, tried in order at startup. Absence is
/// fine; the user opens a file from the menu instead.
const DEFAULT_DATA_FILES: &[&str] = &["dt_index.csv", "dt_index.parquet"];

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "DTI Viewer – Digital Transformation Index",
        options,
        Box::new(|_cc| {
            let mut app = DtiViewerApp::default();
            for candidate in DEFAULT_DATA_FILES {
                let path = Path::new(candidate);
                if path.exists() {
                    app.state.load_path(path);
                    break;
                }
            }
            Ok(Box::new(app))
        }),
    )
}
