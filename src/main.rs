#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod config;
mod derive;
mod error;
mod fetch;
mod filter;
mod map;
mod maps_api;
mod model;
mod overlay;
mod ui;

use log::error;

use crate::config::AppConfig;
use crate::error::StartupError;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    };
    // histmap [LOCATION], e.g. `histmap "/local?transport=road"`
    let start = std::env::args().nth(1);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(egui::vec2(1440.0, 900.0))
            .with_min_inner_size(egui::vec2(640.0, 400.0))
            .with_title("Ялтинская конференция")
            .with_resizable(true)
            .with_decorations(true),
        ..Default::default()
    };

    eframe::run_native(
        "histmap",
        native_options,
        Box::new(move |cc| {
            let app = ui::HistMapApp::new(cc, config, start).map_err(|e: StartupError| {
                error!("{e}");
                Box::new(e) as Box<dyn std::error::Error + Send + Sync>
            })?;
            Ok(Box::new(app))
        }),
    )
}
