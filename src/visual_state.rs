//! State handed from the route driver thread to the render thread.
//!
//! Three independent guarded regions: the path geometry, the summary text and the
//! generation text. Each one is replaced wholesale under its own lock, so a reader
//! sees either the previous value or the new one in full. Regions are not atomic
//! with respect to each other: a frame may pair route N's path with route N-1's
//! summary for one frame if the draw lands between the two publishes.
//!
//! The path is kept as an `Arc<[LineSegment]>`; readers clone the `Arc` under the
//! lock and draw from their snapshot after releasing it, so a slow frame never
//! holds up the driver.

use eframe::egui::Color32;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::projector::LineSegment;

#[derive(Clone, Debug)]
struct SummaryText {
    text: String,
    color: Color32,
    /// once set, wins over `color` until the state is dropped
    completed_color: Option<Color32>,
}

impl SummaryText {
    fn shown_color(&self) -> Color32 {
        self.completed_color.unwrap_or(self.color)
    }
}

#[derive(Debug)]
pub struct SharedVisualState {
    path: Mutex<Arc<[LineSegment]>>,
    summary: Mutex<SummaryText>,
    generation: Mutex<Arc<str>>,
}

impl SharedVisualState {
    /// Empty path, empty summary in `text_color`, generation text as given
    pub fn new(text_color: Color32, generation_text: impl Into<Arc<str>>) -> Self {
        Self {
            path: Mutex::new(Arc::from(Vec::new())),
            summary: Mutex::new(SummaryText {
                text: String::new(),
                color: text_color,
                completed_color: None,
            }),
            generation: Mutex::new(generation_text.into()),
        }
    }

    /// Replace the whole path. The new slice is built before the lock is taken,
    /// so the critical section is a pointer swap.
    pub fn publish_path(&self, segments: impl Into<Arc<[LineSegment]>>) {
        profiling::scope!("publish_path");
        let segments = segments.into();
        let old = std::mem::replace(&mut *self.path.lock(), segments);
        // the previous snapshot is freed here, outside the lock, unless a reader still holds it
        drop(old);
    }

    pub fn publish_summary(&self, text: String, color: Color32) {
        profiling::scope!("publish_summary");
        let mut summary = self.summary.lock();
        summary.text = text;
        summary.color = color;
    }

    /// Snapshot of the current path; the lock is released before this returns
    pub fn read_path(&self) -> Arc<[LineSegment]> {
        Arc::clone(&self.path.lock())
    }

    /// Current summary text and the colour it should be drawn in
    pub fn read_summary(&self) -> (String, Color32) {
        let summary = self.summary.lock();
        (summary.text.clone(), summary.shown_color())
    }

    /// Switch the summary to its completed colour. One-way: later summaries keep it.
    pub fn set_completed_color(&self, color: Color32) {
        self.summary.lock().completed_color = Some(color);
    }

    #[cfg(test)]
    pub fn is_completed(&self) -> bool {
        self.summary.lock().completed_color.is_some()
    }

    pub fn set_generation_text(&self, text: impl Into<Arc<str>>) {
        *self.generation.lock() = text.into();
    }

    pub fn read_generation_text(&self) -> Arc<str> {
        Arc::clone(&self.generation.lock())
    }
}

impl Default for SharedVisualState {
    fn default() -> Self {
        Self::new(Color32::BLACK, "")
    }
}
