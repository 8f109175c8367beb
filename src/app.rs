use eframe::egui::{self, Color32};
use std::sync::Arc;
use std::time::Duration;

use crate::app_types::DriverCommand;
use crate::driver::{spawn_driver, DriverThread};
use crate::error::StartupError;
use crate::optimizer::RouteSearch;
use crate::screen::{Drawable, SimulationScreen, Updatable};
use crate::settings::{color32, AppSettings};
use crate::towns::TownRegistry;
use crate::ui::{handle_keyboard_input, PainterSurface};

pub struct RouteViewerApp {
    screen: SimulationScreen,

    // communication with the driver thread; dropped (stopped + joined) with the app
    driver: Option<DriverThread>,
    running: bool,

    background: Color32,
    frame_interval: Duration,
}

impl RouteViewerApp {
    /// Build the screen (loads the font) and start the route driver.
    /// Either failing aborts startup.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: AppSettings,
        towns: Arc<TownRegistry>,
    ) -> Result<Self, StartupError> {
        let screen = SimulationScreen::new(&cc.egui_ctx, Arc::clone(&towns), &settings)?;

        let optimizer = RouteSearch::new(towns, settings.optimizer);
        let ctx = cc.egui_ctx.clone();
        let driver = spawn_driver(screen.handle(), optimizer, settings.autostart, move || {
            ctx.request_repaint();
        })?;

        Ok(Self {
            screen,
            driver: Some(driver),
            running: settings.autostart,
            background: color32(settings.background_color),
            frame_interval: settings.frame_interval(),
        })
    }

    fn toggle_running(&mut self) {
        self.running = !self.running;
        if let Some(driver) = &self.driver {
            let cmd = if self.running {
                DriverCommand::Start
            } else {
                DriverCommand::Pause
            };
            driver.send(cmd);
        }
    }
}

impl eframe::App for RouteViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::scope!("app_update");

        let actions = handle_keyboard_input(ctx);
        if actions.quit {
            tracing::info!("quit requested");
            if let Some(driver) = self.driver.take() {
                driver.shutdown();
            }
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if actions.toggle_running {
            self.toggle_running();
        }

        let dt = ctx.input(|i| i.stable_dt);
        self.screen.update(dt);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(self.background))
            .show(ctx, |ui| {
                let to_screen = self.screen.camera().to_screen(ui.max_rect());
                let mut surface = PainterSurface::new(ui.painter(), to_screen);
                self.screen.draw(&mut surface, dt);
            });

        // fixed render cadence; the driver also requests a repaint after each publish
        ctx.request_repaint_after(self.frame_interval);

        profiling::finish_frame!();
    }
}
