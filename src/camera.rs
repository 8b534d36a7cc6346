//! Viewport transform between screen pixels and document units.
//!
//! The host reports pointer positions in screen pixels relative to the page
//! (client coordinates). `Viewport` subtracts the container origin and pan
//! offset, then divides by zoom, so every edit is stored in zoom-independent
//! document units.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::consts::{FIT_MARGIN, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

/// A point in either screen or document space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Zoom limits and wheel step applied by [`Viewport::zoom_at`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPolicy {
    pub step: f64,
    pub min: f64,
    pub max: f64,
    pub fit_margin: f64,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self { step: ZOOM_STEP, min: MIN_ZOOM, max: MAX_ZOOM, fit_margin: FIT_MARGIN }
    }
}

/// Pan/zoom state of the document surface.
///
/// `pan_x` / `pan_y` are screen pixels measured from the container origin.
/// `origin_x` / `origin_y` locate the container's top-left corner on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { zoom: 1.0, pan_x: 0.0, pan_y: 0.0, origin_x: 0.0, origin_y: 0.0 }
    }
}

impl Viewport {
    /// Convert a screen point to document coordinates.
    #[must_use]
    pub fn screen_to_doc(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.origin_x - self.pan_x) / self.zoom,
            y: (screen.y - self.origin_y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a document point to screen coordinates.
    #[must_use]
    pub fn doc_to_screen(&self, doc: Point) -> Point {
        Point {
            x: doc.x * self.zoom + self.pan_x + self.origin_x,
            y: doc.y * self.zoom + self.pan_y + self.origin_y,
        }
    }

    /// Convert a screen-space distance to document units.
    #[must_use]
    pub fn screen_dist_to_doc(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Move the container origin (e.g. after the host layout shifts).
    pub fn set_origin(&mut self, origin_x: f64, origin_y: f64) {
        self.origin_x = origin_x;
        self.origin_y = origin_y;
    }

    /// Apply `steps` discrete wheel steps around `screen` (positive zooms in).
    ///
    /// The document point under the cursor stays under the cursor. Returns
    /// `false` when the zoom was already pinned at a limit.
    pub fn zoom_at(&mut self, screen: Point, steps: i32, policy: &ZoomPolicy) -> bool {
        let factor = policy.step.powi(steps);
        let new_zoom = (self.zoom * factor).clamp(policy.min, policy.max);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        // Cursor relative to the container, matching the pan's reference frame.
        let cx = screen.x - self.origin_x;
        let cy = screen.y - self.origin_y;
        let ratio = new_zoom / self.zoom;
        self.pan_x = cx - (cx - self.pan_x) * ratio;
        self.pan_y = cy - (cy - self.pan_y) * ratio;
        self.zoom = new_zoom;
        true
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Fit a `page_w × page_h` page into a `view_w × view_h` container, centred.
    ///
    /// Degenerate page or viewport sizes leave the viewport untouched.
    pub fn fit_to_page(&mut self, page_w: f64, page_h: f64, view_w: f64, view_h: f64, policy: &ZoomPolicy) {
        if page_w <= 0.0 || page_h <= 0.0 || view_w <= 0.0 || view_h <= 0.0 {
            return;
        }
        let zoom = ((view_w / page_w).min(view_h / page_h) * policy.fit_margin).clamp(policy.min, policy.max);
        self.zoom = zoom;
        self.pan_x = (view_w - page_w * zoom) / 2.0;
        self.pan_y = (view_h - page_h * zoom) / 2.0;
    }
}
