mod app;
mod app_types;
mod camera;
mod driver;
mod error;
mod fonts;
mod individual;
mod optimizer;
mod projector;
mod screen;
mod settings;
mod towns;
mod ui;
mod visual_state;

use eframe::egui;
use std::sync::Arc;

use crate::settings::AppSettings;
use crate::towns::TownRegistry;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_thread_ids(true)
        .with_max_level(tracing::Level::INFO)
        .init();

    // configure Rayon's global thread pool once at startup so worker threads get nice names like "rayon-0".
    let _ = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("rayon-{i}"))
        .build_global();

    let settings = AppSettings::load();
    let towns = Arc::new(TownRegistry::from_settings(
        &settings.towns,
        egui::vec2(settings.world_width, settings.world_height),
    ));
    if towns.is_empty() {
        tracing::warn!("no towns configured, the map will stay empty");
    } else {
        tracing::info!(towns = towns.len(), "towns ready");
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(settings.window_title.clone())
            .with_inner_size([1280.0, 720.0])
            .with_resizable(true),
        ..Default::default()
    };
    let title = settings.window_title.clone();
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| {
            let app = crate::app::RouteViewerApp::new(cc, settings, towns).inspect_err(|e| {
                tracing::error!(error = %e, "startup failed");
            })?;
            Ok::<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>>(Box::new(app))
        }),
    )
}
