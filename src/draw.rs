//! In-progress shape drawing (freehand, rectangle, conduit).
//!
//! A [`Draft`] is seeded at the pointer-down document point with zero size and
//! grows with each pointer-move. Nothing is committed until [`Draft::finish`],
//! which discards click-sized gestures and normalizes reverse-direction drags
//! into a positive-size frame.

#[cfg(test)]
#[path = "draw_test.rs"]
mod draw_test;

use crate::camera::Point;
use crate::consts::MIN_EDIT_SIZE;
use crate::doc::{ConduitEdit, DrawingEdit, Edit, EditId, EditKind, Frame, Rect, RectangleEdit};

/// Tools that create an edit by dragging out a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeTool {
    Freehand,
    Rectangle,
    Conduit,
}

/// A shape being drawn between pointer-down and pointer-up.
#[derive(Debug, Clone)]
pub struct Draft {
    pub tool: ShapeTool,
    /// Id the committed edit will carry, so previews stay stable.
    pub id: EditId,
    pub page: u32,
    /// Document point of the pointer-down.
    pub anchor: Point,
    /// Latest document point.
    pub current: Point,
    /// Freehand samples in document space, anchor first.
    pub points: Vec<Point>,
    anchor_screen: Point,
    max_screen_displacement: f64,
}

impl Draft {
    #[must_use]
    pub fn begin(tool: ShapeTool, page: u32, anchor: Point, anchor_screen: Point) -> Self {
        Self {
            tool,
            id: EditId::new_v4(),
            page,
            anchor,
            current: anchor,
            points: vec![anchor],
            anchor_screen,
            max_screen_displacement: 0.0,
        }
    }

    /// Record a pointer-move.
    pub fn extend(&mut self, doc: Point, screen: Point) {
        self.current = doc;
        if self.tool == ShapeTool::Freehand {
            self.points.push(doc);
        }
        self.max_screen_displacement = self.max_screen_displacement.max(screen.distance_to(self.anchor_screen));
    }

    /// Whether the gesture never left the click threshold.
    #[must_use]
    pub fn was_click(&self, threshold_px: f64) -> bool {
        self.max_screen_displacement < threshold_px
    }

    /// The edit as it would look if committed now (unclamped, for rendering).
    #[must_use]
    pub fn preview(&self) -> Edit {
        self.build(false)
    }

    /// Finalize the gesture. Click-sized gestures yield `None`.
    #[must_use]
    pub fn finish(self, threshold_px: f64) -> Option<Edit> {
        if self.was_click(threshold_px) {
            return None;
        }
        Some(self.build(true))
    }

    fn build(&self, clamp: bool) -> Edit {
        let min = if clamp { MIN_EDIT_SIZE } else { 0.0 };
        let (bounds, kind) = match self.tool {
            ShapeTool::Rectangle => {
                let r = Rect::from_corners(self.anchor, self.current);
                let r = Rect { width: r.width.max(min), height: r.height.max(min), ..r };
                (r, EditKind::Rectangle(RectangleEdit::default()))
            }
            ShapeTool::Conduit => {
                let conduit = ConduitEdit {
                    flip_x: self.current.x < self.anchor.x,
                    flip_y: self.current.y < self.anchor.y,
                    ..ConduitEdit::default()
                };
                (Rect::from_corners(self.anchor, self.current), EditKind::Conduit(conduit))
            }
            ShapeTool::Freehand => {
                let r = bounding_rect(&self.points);
                let r = Rect { width: r.width.max(min), height: r.height.max(min), ..r };
                let points = self.points.iter().map(|p| Point::new(p.x - r.x, p.y - r.y)).collect();
                let drawing = DrawingEdit {
                    points,
                    view_width: r.width,
                    view_height: r.height,
                    stroke_color: "#1F1A17".into(),
                    stroke_width: 2.0,
                };
                (r, EditKind::Drawing(drawing))
            }
        };

        let frame = Frame {
            id: self.id,
            page_index: Some(self.page),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            rotation: 0.0,
        };
        Edit::new(frame, kind)
    }
}

fn bounding_rect(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points.iter().skip(1) {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Rect { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y }
}
