mod app;
mod color;
mod data;
mod state;
mod stats;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use app::DashboardApp;
use eframe::egui;

const DEFAULT_DATA_PATH: &str = "diabetes_dataset.csv";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // The dataset is loaded once, before any window appears; a load failure
    // aborts launch.
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
    let dataset = data::loader::load_file(&path)
        .with_context(|| format!("loading dataset from {}", path.display()))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 1000.0])
            .with_min_inner_size([1200.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Diabetes Analysis Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
