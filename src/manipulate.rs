//! Frame manipulation math: move, corner resize, rotate.
//!
//! Pure functions over [`Frame`]s. The interaction engine calls these on every
//! pointer-move with the drag's original frame and the accumulated document
//! delta, so results never drift from repeated incremental application.

#[cfg(test)]
#[path = "manipulate_test.rs"]
mod manipulate_test;

use crate::consts::MIN_EDIT_SIZE;
use crate::doc::Frame;

/// Corner handle used for resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    /// Whether dragging this corner moves the frame's left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Whether dragging this corner moves the frame's top edge.
    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    /// Document position of this corner on `frame`.
    #[must_use]
    pub fn position(self, frame: &Frame) -> (f64, f64) {
        let x = if self.moves_left() { frame.x } else { frame.x + frame.width };
        let y = if self.moves_top() { frame.y } else { frame.y + frame.height };
        (x, y)
    }
}

/// Translate a frame by a document-space delta.
#[must_use]
pub fn translate(orig: &Frame, dx: f64, dy: f64) -> Frame {
    Frame { x: orig.x + dx, y: orig.y + dy, ..*orig }
}

/// Resize `orig` by dragging `corner` a document-space delta `(dx, dy)`.
///
/// With `keep_square` the two axis growths are averaged and applied to both
/// sides so the result is square. Either way each side is clamped to
/// [`MIN_EDIT_SIZE`] with the opposite corner held in place.
#[must_use]
pub fn resize(orig: &Frame, corner: Corner, dx: f64, dy: f64, keep_square: bool) -> Frame {
    // Growth of each side in the corner's outward direction.
    let grow_w = if corner.moves_left() { -dx } else { dx };
    let grow_h = if corner.moves_top() { -dy } else { dy };

    let (width, height) = if keep_square {
        let base = (orig.width + orig.height) / 2.0;
        let side = (base + (grow_w + grow_h) / 2.0).max(MIN_EDIT_SIZE);
        (side, side)
    } else {
        ((orig.width + grow_w).max(MIN_EDIT_SIZE), (orig.height + grow_h).max(MIN_EDIT_SIZE))
    };

    let x = if corner.moves_left() { orig.x + orig.width - width } else { orig.x };
    let y = if corner.moves_top() { orig.y + orig.height - height } else { orig.y };

    Frame { x, y, width, height, ..*orig }
}

/// Wrap degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Rotate a frame about its own center by `delta` degrees.
#[must_use]
pub fn rotate(orig: &Frame, delta: f64) -> Frame {
    Frame { rotation: normalize_degrees(orig.rotation + delta), ..*orig }
}
