// route -> drawable line segments
//
// pure transform over the read-only town registry; safe to call from the driver
// thread without touching any lock. only publishing the result needs the shared state.

use eframe::egui::{Color32, Pos2};
use std::sync::Arc;

use crate::towns::{TownId, TownRegistry};

/// One drawn edge of a route, in world coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    pub from: Pos2,
    pub to: Pos2,
    pub thickness: f32,
    pub color: Color32,
}

#[derive(Clone, Debug)]
pub struct PathProjector {
    towns: Arc<TownRegistry>,
    thickness: f32,
    color: Color32,
    close_loop: bool,
}

impl PathProjector {
    pub fn new(towns: Arc<TownRegistry>, thickness: f32, color: Color32, close_loop: bool) -> Self {
        Self {
            towns,
            thickness,
            color,
            close_loop,
        }
    }

    /// Segments connecting consecutive towns in route order.
    /// closing edge back to the start only for closed loops of 3+ towns
    /// (a 2-town "loop" would just redraw the same edge).
    pub fn project(&self, sequence: &[TownId]) -> Vec<LineSegment> {
        profiling::scope!("project_path");
        if sequence.len() < 2 {
            return Vec::new();
        }

        let closing = self.close_loop && sequence.len() >= 3;
        let edge_count = if closing { sequence.len() } else { sequence.len() - 1 };

        let mut segments = Vec::with_capacity(edge_count);
        for i in 0..edge_count {
            let a = sequence[i];
            let b = sequence[(i + 1) % sequence.len()];
            match (self.towns.position(a), self.towns.position(b)) {
                (Some(from), Some(to)) => segments.push(LineSegment {
                    from,
                    to,
                    thickness: self.thickness,
                    color: self.color,
                }),
                _ => {
                    tracing::warn!(
                        from = a,
                        to = b,
                        towns = self.towns.len(),
                        "route references unknown town, edge skipped"
                    );
                }
            }
        }
        segments
    }
}
