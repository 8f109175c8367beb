use eframe::egui::{self, emath::RectTransform, Align2, Color32, FontFamily, FontId, Pos2, Stroke};

use crate::camera::Camera;
use crate::projector::LineSegment;
use crate::towns::TownMarker;

/// Text with the colour and size it is drawn in (size in world units)
#[derive(Clone, Debug, PartialEq)]
pub struct FontText {
    pub text: String,
    pub color: Color32,
    pub size: f32,
    pub family: FontFamily,
}

impl FontText {
    pub fn new(text: impl Into<String>, color: Color32, size: f32, family: FontFamily) -> Self {
        Self {
            text: text.into(),
            color,
            size,
            family,
        }
    }
}

/// Where a text position sits relative to the laid out text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Centered,
    TopLeft,
}

impl TextAnchor {
    fn align(self) -> Align2 {
        match self {
            TextAnchor::Centered => Align2::CENTER_CENTER,
            TextAnchor::TopLeft => Align2::LEFT_TOP,
        }
    }
}

/// Primitive draw operations a screen needs; positions are world coordinates.
pub trait RenderSurface {
    fn draw_marker(&mut self, marker: &TownMarker);
    fn draw_segment(&mut self, segment: &LineSegment);
    fn draw_text(&mut self, text: &FontText, position: Pos2, anchor: TextAnchor);
}

/// egui painter behind the camera transform
pub struct PainterSurface<'a> {
    painter: &'a egui::Painter,
    to_screen: RectTransform,
    scale: f32,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a egui::Painter, to_screen: RectTransform) -> Self {
        let scale = Camera::scale_of(&to_screen);
        Self {
            painter,
            to_screen,
            scale,
        }
    }
}

impl RenderSurface for PainterSurface<'_> {
    fn draw_marker(&mut self, marker: &TownMarker) {
        let rect = self.to_screen.transform_rect(marker.rect);
        self.painter.rect_filled(rect, 0.0, marker.color);
    }

    fn draw_segment(&mut self, segment: &LineSegment) {
        let from = self.to_screen.transform_pos(segment.from);
        let to = self.to_screen.transform_pos(segment.to);
        // keep hairlines visible when the window is much smaller than the world
        let width = (segment.thickness * self.scale).max(1.0);
        self.painter
            .line_segment([from, to], Stroke::new(width, segment.color));
    }

    fn draw_text(&mut self, text: &FontText, position: Pos2, anchor: TextAnchor) {
        if text.text.is_empty() {
            return;
        }
        let pos = self.to_screen.transform_pos(position);
        let font = FontId::new((text.size * self.scale).max(1.0), text.family.clone());
        self.painter
            .text(pos, anchor.align(), &text.text, font, text.color);
    }
}

/// Everything a screen asked to draw, in order
#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Marker(TownMarker),
    Segment(LineSegment),
    Text(FontText, Pos2, TextAnchor),
}

#[cfg(test)]
#[derive(Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

#[cfg(test)]
impl RenderSurface for RecordingSurface {
    fn draw_marker(&mut self, marker: &TownMarker) {
        self.commands.push(DrawCommand::Marker(*marker));
    }

    fn draw_segment(&mut self, segment: &LineSegment) {
        self.commands.push(DrawCommand::Segment(*segment));
    }

    fn draw_text(&mut self, text: &FontText, position: Pos2, anchor: TextAnchor) {
        self.commands
            .push(DrawCommand::Text(text.clone(), position, anchor));
    }
}
