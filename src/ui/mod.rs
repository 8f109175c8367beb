// UI module organization
// input handling and the egui-backed render surface

pub mod input;
pub mod surface;

pub use input::handle_keyboard_input;
pub use surface::PainterSurface;
