mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::Path;

use anyhow::Context;
use app::SalesDashboardApp;
use eframe::egui;

/// Loaded at startup from the working directory.
const DATA_PATH: &str = "data.csv";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let dataset = match data::loader::load_file(Path::new(DATA_PATH)) {
        Ok(ds) => ds,
        Err(e) => {
            log::error!("Failed to load {DATA_PATH}: {e:#}");
            return Err(e).context("startup dataset load");
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sales Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(SalesDashboardApp::new(dataset)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
