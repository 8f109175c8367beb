use eframe::egui;

/// What the keyboard asked for this frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputActions {
    pub quit: bool,
    pub toggle_running: bool,
}

/// Handle keyboard shortcuts
pub fn handle_keyboard_input(ctx: &egui::Context) -> InputActions {
    ctx.input(|i| InputActions {
        // q: quit (matches the on-screen hint)
        quit: i.key_pressed(egui::Key::Q),
        // space: toggle run/pause
        toggle_running: i.key_pressed(egui::Key::Space),
    })
}
