use eframe::egui::{Color32, Pos2, Rect, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::{color32, TownLayout, TownSettings};

/// Index of a town in the registry
pub type TownId = usize;

/// Square drawn at a town's position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TownMarker {
    pub rect: Rect,
    pub color: Color32,
}

/// A town; its `TownId` is its index in the registry
#[derive(Clone, Debug, PartialEq)]
pub struct Town {
    pub position: Pos2,
    /// travel speed allowed when leaving or entering this town
    pub speed_limit: f32,
    pub marker: TownMarker,
}

/// All towns on the map, in id order. Built once at startup and only read afterwards,
/// so it is shared between the driver and the renderer behind an `Arc` without locking.
#[derive(Clone, Debug, Default)]
pub struct TownRegistry {
    towns: Vec<Town>,
}

impl TownRegistry {
    /// Build towns from (position, speed limit) pairs; ids follow input order
    pub fn new(
        places: impl IntoIterator<Item = (Pos2, f32)>,
        marker_size: f32,
        marker_color: Color32,
    ) -> Self {
        let towns = places
            .into_iter()
            .map(|(position, speed_limit)| Town {
                position,
                speed_limit,
                marker: TownMarker {
                    rect: Rect::from_center_size(position, Vec2::splat(marker_size)),
                    color: marker_color,
                },
            })
            .collect();
        Self { towns }
    }

    /// Populate towns from the settings: either the fixed list or a seeded scatter inside the world
    pub fn from_settings(settings: &TownSettings, world_size: Vec2) -> Self {
        let marker_color = color32(settings.marker_color);
        match &settings.layout {
            TownLayout::Fixed(entries) => Self::new(
                entries.iter().map(|&[x, y, speed]| (Pos2::new(x, y), speed)),
                settings.marker_size,
                marker_color,
            ),
            TownLayout::Scattered { count, seed } => {
                let mut rng = Pcg32::seed_from_u64(*seed);
                // shrink the margin on small worlds so the sampling range never inverts
                let margin = settings
                    .margin
                    .min(world_size.x * 0.25)
                    .min(world_size.y * 0.25)
                    .max(0.0);
                let (speed_min, speed_max) = ordered(settings.speed_min, settings.speed_max);
                let places: Vec<(Pos2, f32)> = (0..*count)
                    .map(|_| {
                        let x = margin + rng.random::<f32>() * (world_size.x - 2.0 * margin);
                        let y = margin + rng.random::<f32>() * (world_size.y - 2.0 * margin);
                        let speed = speed_min + rng.random::<f32>() * (speed_max - speed_min);
                        (Pos2::new(x, y), speed)
                    })
                    .collect();
                Self::new(places, settings.marker_size, marker_color)
            }
        }
    }

    pub fn towns(&self) -> &[Town] {
        &self.towns
    }

    pub fn get(&self, id: TownId) -> Option<&Town> {
        self.towns.get(id)
    }

    pub fn position(&self, id: TownId) -> Option<Pos2> {
        self.towns.get(id).map(|t| t.position)
    }

    pub fn len(&self) -> usize {
        self.towns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.towns.is_empty()
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
