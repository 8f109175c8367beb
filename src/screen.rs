//! The simulation screen: static town markers plus the route and fitness text the
//! driver thread publishes. The render thread owns the `SimulationScreen`; the driver
//! gets a `ScreenHandle` sharing the same visual state.

use eframe::egui::{self, pos2, vec2, Color32, FontFamily, Pos2};
use std::sync::Arc;

use crate::camera::Camera;
use crate::error::StartupError;
use crate::individual::Individual;
use crate::projector::PathProjector;
use crate::settings::{color32, AppSettings};
use crate::towns::{TownMarker, TownRegistry};
use crate::ui::surface::{FontText, RenderSurface, TextAnchor};
use crate::visual_state::SharedVisualState;

pub const QUIT_TEXT: &str = "Press 'Q' to quit.";

/// Advanced once per frame by the app loop
pub trait Updatable {
    fn update(&mut self, delta_time: f32);
}

/// Draws itself onto a surface; must not block on producers beyond a snapshot copy
pub trait Drawable {
    fn draw(&self, surface: &mut dyn RenderSurface, delta_time: f32);
}

/// What the optimizer side calls on the screen. Safe to call while another thread draws.
pub trait RouteDisplay {
    /// Show a new best route and its fitness summary
    fn update_sequence(&self, individual: &Individual);
    fn set_generation(&self, generation: u64);
    /// Optimizer has stopped improving: turn the summary green. Repeated calls change nothing.
    fn set_completed(&self);
}

/// Round to two decimals (ties away from zero) and drop trailing zeros:
/// 12.30 -> "12.3", 100.00 -> "100", 0.125 -> "0.13"
pub fn format_fitness(value: f64) -> String {
    // `{:.2}` alone would round 0.125 to even
    let scaled = (value * 100.0).round();
    let value = if scaled.is_finite() { scaled / 100.0 } else { value };
    let fixed = format!("{value:.2}");
    if !fixed.contains('.') {
        // inf / NaN
        return fixed;
    }
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_owned()
    } else {
        trimmed.to_owned()
    }
}

pub fn format_summary(distance: f64, time: f64) -> String {
    format!(
        "Distance: {}\t\tTime: {}",
        format_fitness(distance),
        format_fitness(time)
    )
}

pub fn generation_text(generation: u64) -> String {
    format!("Generation: {generation}")
}

/// Producer side of the screen. Cheap to clone, safe to move to the driver thread.
#[derive(Clone, Debug)]
pub struct ScreenHandle {
    state: Arc<SharedVisualState>,
    projector: PathProjector,
    text_color: Color32,
    completed_color: Color32,
}

impl ScreenHandle {
    /// Replace the generation line with an arbitrary display string
    pub fn set_generation_text(&self, text: impl Into<Arc<str>>) {
        self.state.set_generation_text(text);
    }

    pub fn state(&self) -> &Arc<SharedVisualState> {
        &self.state
    }
}

impl RouteDisplay for ScreenHandle {
    /// Project the route, then publish path and summary (two separate lock regions, path first).
    fn update_sequence(&self, individual: &Individual) {
        profiling::scope!("update_sequence");
        // both built before any lock is taken
        let segments = self.projector.project(individual.sequence());
        let summary = format_summary(individual.distance_fitness(), individual.time_fitness());

        self.state.publish_path(segments);
        self.state.publish_summary(summary, self.text_color);
    }

    fn set_generation(&self, generation: u64) {
        self.set_generation_text(generation_text(generation));
    }

    fn set_completed(&self) {
        self.state.set_completed_color(self.completed_color);
    }
}

/// Fixed world positions of the three text lines
#[derive(Clone, Copy, Debug)]
struct TextLayout {
    summary: Pos2,
    generation: Pos2,
    quit: Pos2,
}

impl TextLayout {
    fn for_world(width: f32, height: f32) -> Self {
        Self {
            summary: pos2(width / 2.0, 50.0),
            generation: pos2(50.0, 50.0),
            quit: pos2(450.0, height - 100.0),
        }
    }
}

/// Frame count and elapsed time; logs the frame rate every few seconds
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    frames: u64,
    elapsed: f64,
    window_frames: u32,
    window_elapsed: f32,
}

impl FrameClock {
    const REPORT_EVERY_SECS: f32 = 5.0;

    pub fn tick(&mut self, delta_time: f32) {
        let dt = delta_time.max(0.0);
        self.frames += 1;
        self.elapsed += dt as f64;
        self.window_frames += 1;
        self.window_elapsed += dt;

        if self.window_elapsed >= Self::REPORT_EVERY_SECS {
            let fps = self.window_frames as f32 / self.window_elapsed;
            tracing::trace!(fps, frames = self.frames, "render rate");
            self.window_frames = 0;
            self.window_elapsed = 0.0;
        }
    }
}

pub struct SimulationScreen {
    /// copied once from the registry, never touched again
    town_visuals: Vec<TownMarker>,
    camera: Camera,
    clock: FrameClock,
    handle: ScreenHandle,
    layout: TextLayout,
    text_size: f32,
    family: FontFamily,
    quit_text: FontText,
}

impl SimulationScreen {
    /// Load the font into the egui context and build the screen.
    /// A configured font that cannot be loaded makes the screen unusable.
    pub fn new(
        ctx: &egui::Context,
        towns: Arc<TownRegistry>,
        settings: &AppSettings,
    ) -> Result<Self, StartupError> {
        let family = crate::fonts::install_font(ctx, settings.font_path.as_deref())?;
        Ok(Self::with_font(towns, settings, family))
    }

    /// Build the screen with an already installed font family
    pub fn with_font(towns: Arc<TownRegistry>, settings: &AppSettings, family: FontFamily) -> Self {
        let town_visuals = towns.towns().iter().map(|t| t.marker).collect();
        let camera = Camera::new(
            settings.camera_mode,
            vec2(settings.world_width, settings.world_height),
        );

        let text_color = color32(settings.text_color);
        let projector = PathProjector::new(
            towns,
            settings.path_thickness,
            color32(settings.path_color),
            settings.close_loop,
        );
        let handle = ScreenHandle {
            state: Arc::new(SharedVisualState::new(text_color, generation_text(0))),
            projector,
            text_color,
            completed_color: color32(settings.completed_color),
        };

        let quit_text = FontText::new(QUIT_TEXT, text_color, settings.text_size, family.clone());

        Self {
            town_visuals,
            camera,
            clock: FrameClock::default(),
            handle,
            layout: TextLayout::for_world(settings.world_width, settings.world_height),
            text_size: settings.text_size,
            family,
            quit_text,
        }
    }

    /// Producer-side handle for the driver thread
    pub fn handle(&self) -> ScreenHandle {
        self.handle.clone()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn state(&self) -> &Arc<SharedVisualState> {
        self.handle.state()
    }

    fn text(&self, text: impl Into<String>, color: Color32) -> FontText {
        FontText::new(text, color, self.text_size, self.family.clone())
    }
}

impl RouteDisplay for SimulationScreen {
    fn update_sequence(&self, individual: &Individual) {
        self.handle.update_sequence(individual);
    }

    fn set_generation(&self, generation: u64) {
        self.handle.set_generation(generation);
    }

    fn set_completed(&self) {
        self.handle.set_completed();
    }
}

impl Updatable for SimulationScreen {
    fn update(&mut self, delta_time: f32) {
        self.clock.tick(delta_time);
    }
}

impl Drawable for SimulationScreen {
    fn draw(&self, surface: &mut dyn RenderSurface, _delta_time: f32) {
        profiling::scope!("draw_simulation_screen");

        for marker in &self.town_visuals {
            surface.draw_marker(marker);
        }

        // snapshot only; drawing happens with the lock released
        let path = self.state().read_path();
        for segment in path.iter() {
            surface.draw_segment(segment);
        }

        let (summary, color) = self.state().read_summary();
        surface.draw_text(&self.text(summary, color), self.layout.summary, TextAnchor::Centered);

        let generation = self.state().read_generation_text();
        surface.draw_text(
            &self.text(&*generation, self.quit_text.color),
            self.layout.generation,
            TextAnchor::TopLeft,
        );

        surface.draw_text(&self.quit_text, self.layout.quit, TextAnchor::Centered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::LineSegment;
    use crate::settings::TownLayout;
    use crate::ui::surface::{DrawCommand, RecordingSurface};
    use std::sync::atomic::{AtomicBool, Ordering};

    fn settings() -> AppSettings {
        let mut settings = AppSettings::default();
        settings.world_width = 1000.0;
        settings.world_height = 800.0;
        settings.towns.layout = TownLayout::Fixed(
            (0..8)
                .map(|i| [100.0 + 90.0 * i as f32, 200.0 + 40.0 * (i % 3) as f32, 60.0])
                .collect(),
        );
        settings
    }

    fn screen() -> SimulationScreen {
        let settings = settings();
        let towns = Arc::new(TownRegistry::from_settings(
            &settings.towns,
            vec2(settings.world_width, settings.world_height),
        ));
        SimulationScreen::with_font(towns, &settings, FontFamily::Proportional)
    }

    fn frame(screen: &SimulationScreen) -> Vec<DrawCommand> {
        let mut surface = RecordingSurface::default();
        screen.draw(&mut surface, 1.0 / 60.0);
        surface.commands
    }

    fn segments(commands: &[DrawCommand]) -> Vec<LineSegment> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Segment(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn markers(commands: &[DrawCommand]) -> Vec<DrawCommand> {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Marker(_)))
            .cloned()
            .collect()
    }

    fn texts(commands: &[DrawCommand]) -> Vec<(String, Color32, Pos2, TextAnchor)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(t, pos, anchor) => Some((t.text.clone(), t.color, *pos, *anchor)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fitness_formatting() {
        assert_eq!(format_summary(1234.567, 12.3), "Distance: 1234.57\t\tTime: 12.3");
        assert_eq!(format_fitness(100.0), "100");
        assert_eq!(format_fitness(1234.5), "1234.5");
        assert_eq!(format_fitness(0.5), "0.5");
        assert_eq!(format_fitness(0.0), "0");
        assert_eq!(format_fitness(-0.001), "0");
        assert_eq!(format_fitness(99.999), "100");
        assert_eq!(format_fitness(f64::INFINITY), "inf");
    }

    #[test]
    fn fitness_ties_round_away_from_zero() {
        assert_eq!(format_fitness(0.125), "0.13");
        assert_eq!(format_fitness(0.375), "0.38");
        assert_eq!(format_fitness(-0.125), "-0.13");
        assert_eq!(format_summary(2.5, 0.005), "Distance: 2.5\t\tTime: 0.01");
    }

    #[test]
    fn fresh_screen_draws_towns_and_static_text_only() {
        let screen = screen();
        let commands = frame(&screen);

        assert_eq!(markers(&commands).len(), 8);
        assert!(segments(&commands).is_empty());
        let texts = texts(&commands);
        assert_eq!(texts[0].0, "");
        assert_eq!(texts[1].0, "Generation: 0");
        assert_eq!(texts[2].0, QUIT_TEXT);
    }

    #[test]
    fn draw_order_and_positions() {
        let screen = screen();
        screen.update_sequence(&Individual::new(vec![0, 1, 2, 3], 1234.567, 12.3));
        screen.set_generation(17);
        let commands = frame(&screen);

        // towns, then the path, then the three texts
        assert!(commands[..8].iter().all(|c| matches!(c, DrawCommand::Marker(_))));
        assert!(commands[8..12].iter().all(|c| matches!(c, DrawCommand::Segment(_))));
        assert_eq!(commands.len(), 15);

        let texts = texts(&commands);
        assert_eq!(
            texts[0],
            (
                "Distance: 1234.57\t\tTime: 12.3".to_owned(),
                Color32::BLACK,
                pos2(500.0, 50.0),
                TextAnchor::Centered
            )
        );
        assert_eq!(texts[1].0, "Generation: 17");
        assert_eq!((texts[1].2, texts[1].3), (pos2(50.0, 50.0), TextAnchor::TopLeft));
        assert_eq!((texts[2].2, texts[2].3), (pos2(450.0, 700.0), TextAnchor::Centered));
    }

    #[test]
    fn degenerate_routes_clear_the_path() {
        let screen = screen();
        screen.update_sequence(&Individual::new(vec![0, 1, 2], 1.0, 1.0));
        assert_eq!(screen.state().read_path().len(), 3);

        screen.update_sequence(&Individual::new(vec![4], 0.0, 0.0));
        assert!(screen.state().read_path().is_empty());
        screen.update_sequence(&Individual::new(vec![], 0.0, 0.0));
        assert!(screen.state().read_path().is_empty());
        assert_eq!(screen.state().read_summary().0, "Distance: 0\t\tTime: 0");
    }

    #[test]
    fn completion_is_idempotent_and_survives_new_routes() {
        let screen = screen();
        let green = Color32::from_rgba_unmultiplied(0, 160, 0, 255);

        screen.set_completed();
        let once = screen.state().read_summary();
        screen.set_completed();
        screen.set_completed();
        assert_eq!(screen.state().read_summary(), once);
        assert_eq!(once.1, green);

        screen.update_sequence(&Individual::new(vec![0, 1, 2], 10.0, 2.0));
        assert_eq!(screen.state().read_summary().1, green);
        // drawing continues normally after completion
        assert_eq!(segments(&frame(&screen)).len(), 3);
    }

    #[test]
    fn update_does_not_touch_shared_state() {
        let mut screen = screen();
        screen.update_sequence(&Individual::new(vec![0, 1, 2, 3, 4], 5.0, 6.0));
        let path = screen.state().read_path();
        let summary = screen.state().read_summary();

        for _ in 0..600 {
            screen.update(1.0 / 60.0);
        }

        assert_eq!(screen.clock.frames, 600);
        assert!((screen.clock.elapsed - 10.0).abs() < 1e-3);
        assert!(Arc::ptr_eq(&path, &screen.state().read_path()));
        assert_eq!(summary, screen.state().read_summary());
    }

    #[test]
    fn town_visuals_identical_across_frames() {
        let mut screen = screen();
        let first = markers(&frame(&screen));

        for i in 0..1000u64 {
            let len = (i % 8 + 1) as usize;
            screen.update_sequence(&Individual::new((0..len).collect(), i as f64, 1.0));
            screen.update(1.0 / 60.0);
            let _ = frame(&screen);
        }

        assert_eq!(markers(&frame(&screen)), first);
    }

    #[test]
    fn missing_font_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings();
        settings.font_path = Some(dir.path().join("missing.ttf"));
        let ctx = egui::Context::default();
        let towns = Arc::new(TownRegistry::default());

        let result = SimulationScreen::new(&ctx, towns, &settings);
        assert!(matches!(result, Err(StartupError::FontRead { .. })));
    }

    #[test]
    fn concurrent_updates_never_show_a_torn_route() {
        let screen = screen();
        let handle = screen.handle();
        let stop = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..3_000usize {
                    // closed loops over the first 3..=8 towns, rotated so routes differ
                    let len = 3 + i % 6;
                    let sequence: Vec<usize> = (0..len).map(|k| (k + i) % len).collect();
                    handle.update_sequence(&Individual::new(sequence, i as f64, 0.0));
                    handle.set_generation(i as u64);
                }
                stop.store(true, Ordering::Release);
            });

            while !stop.load(Ordering::Acquire) {
                let path = segments(&frame(&screen));
                if path.is_empty() {
                    continue;
                }
                // a whole route is a closed chain; mixing two routes breaks it
                assert!((3..=8).contains(&path.len()));
                for (a, b) in path.iter().zip(path.iter().cycle().skip(1)) {
                    assert_eq!(a.to, b.from, "path mixes segments from different routes");
                }
            }
        });

        assert_eq!(screen.state().read_summary().0, "Distance: 2999\t\tTime: 0");
    }
}
