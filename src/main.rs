mod app;
mod color;
mod state;
mod ui;

use app::CyclePlotterApp;
use cycle_plotter::config::ProcessorConfig;
use eframe::egui;
use state::AppState;

/// Environment variable naming an optional JSON processor config.
const CONFIG_ENV: &str = "CYCLE_PLOTTER_CONFIG";

fn load_config() -> ProcessorConfig {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        return ProcessorConfig::default();
    };
    match ProcessorConfig::from_json_file(&path) {
        Ok(config) => {
            log::info!("Using processor config from {path}");
            config
        }
        Err(e) => {
            log::error!("Ignoring {CONFIG_ENV}: {e:#}");
            ProcessorConfig::default()
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let state = AppState::with_config(load_config());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Formation Cycle Plotter",
        options,
        Box::new(move |cc| {
            // Black single-file lines need a light background.
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(CyclePlotterApp::new(state)))
        }),
    )
}
