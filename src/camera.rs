use eframe::egui::{emath::RectTransform, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// How the world is fitted into the window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    /// whole world visible, aspect ratio preserved, centred with letterboxing
    SinglePlayer,
    /// world stretched over the full viewport
    Stretch,
}

/// Maps fixed world coordinates (towns, text positions) onto whatever size the window currently has.
#[derive(Clone, Debug)]
pub struct Camera {
    mode: CameraMode,
    world: Rect,
}

impl Camera {
    pub fn new(mode: CameraMode, world_size: Vec2) -> Self {
        Self {
            mode,
            world: Rect::from_min_size(Pos2::ZERO, world_size),
        }
    }

    /// World -> screen transform for the given viewport
    pub fn to_screen(&self, viewport: Rect) -> RectTransform {
        let target = match self.mode {
            CameraMode::Stretch => viewport,
            CameraMode::SinglePlayer => {
                // same fit as an aspect-fitted image: the smaller axis ratio wins
                let world_size = self.world.size();
                let scale = (viewport.width() / world_size.x)
                    .min(viewport.height() / world_size.y)
                    .max(0.0);
                let size = world_size * scale;
                Rect::from_min_size(viewport.center() - size * 0.5, size)
            }
        };
        RectTransform::from_to(self.world, target)
    }

    /// Average scale factor of a transform, used for stroke widths and font sizes
    pub fn scale_of(transform: &RectTransform) -> f32 {
        let s = transform.scale();
        (s.x + s.y) * 0.5
    }
}
