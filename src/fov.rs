//! Camera field-of-view cone: geometry, rendering path, and handle drags.
//!
//! A camera's FOV is a circular sector anchored at the device center and
//! parameterized by `(rotation, angle, distance)`. All angles are degrees
//! measured clockwise from +x in document space (y grows downward), so the
//! default rotation of -90 aims straight up the page.
//!
//! Three handles manipulate the sector:
//!
//! | Handle | Position | Drag effect |
//! |--------|----------|-------------|
//! | [`FovHandle::Aim`] | `rotation` at `distance` | re-aims and rescales, angle unchanged |
//! | [`FovHandle::Start`] | `rotation - angle/2` | end edge fixed, angle and rotation recomputed |
//! | [`FovHandle::End`] | `rotation + angle/2` | start edge fixed, angle and rotation recomputed |

#[cfg(test)]
#[path = "fov_test.rs"]
mod fov_test;

use serde_json::Value;

use crate::camera::Point;
use crate::consts::{DEFAULT_FOV_ANGLE, DEFAULT_FOV_DISTANCE, DEFAULT_FOV_ROTATION, MAX_FOV_ANGLE};
use crate::doc::{Data, Edit, Props};

pub const FOV_ANGLE_KEY: &str = "fieldOfViewAngle";
pub const FOV_DISTANCE_KEY: &str = "fieldOfViewDistance";
pub const FOV_ROTATION_KEY: &str = "fieldOfViewRotation";

/// Which FOV handle is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FovHandle {
    Aim,
    Start,
    End,
}

/// Document-space positions of the three FOV handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovHandles {
    pub aim: Point,
    pub start: Point,
    pub end: Point,
}

/// Field-of-view parameters of one camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFov {
    /// Cone width in degrees, `0..=359.9`.
    pub angle: f64,
    /// Cone radius in document units.
    pub distance: f64,
    /// Aim direction in degrees.
    pub rotation: f64,
}

impl Default for CameraFov {
    fn default() -> Self {
        Self { angle: DEFAULT_FOV_ANGLE, distance: DEFAULT_FOV_DISTANCE, rotation: DEFAULT_FOV_ROTATION }
    }
}

impl CameraFov {
    /// Read FOV fields from a device data record, defaulting missing keys.
    #[must_use]
    pub fn from_data(data: &Data) -> Self {
        let props = Props::new(data);
        Self {
            angle: props.number(FOV_ANGLE_KEY).unwrap_or(DEFAULT_FOV_ANGLE),
            distance: props.number(FOV_DISTANCE_KEY).unwrap_or(DEFAULT_FOV_DISTANCE),
            rotation: props.number(FOV_ROTATION_KEY).unwrap_or(DEFAULT_FOV_ROTATION),
        }
    }

    /// The FOV of a camera edit; `None` for anything else.
    #[must_use]
    pub fn of(edit: &Edit) -> Option<Self> {
        if !edit.is_camera() {
            return None;
        }
        edit.kind.data().map(Self::from_data)
    }

    /// Write the three FOV fields into a device data record.
    pub fn write_to(&self, data: &mut Data) {
        data.insert(FOV_ANGLE_KEY.into(), Value::from(self.angle));
        data.insert(FOV_DISTANCE_KEY.into(), Value::from(self.distance));
        data.insert(FOV_ROTATION_KEY.into(), Value::from(self.rotation));
    }

    /// Angle of the start edge in degrees.
    #[must_use]
    pub fn start_angle(&self) -> f64 {
        self.rotation - self.angle / 2.0
    }

    /// Angle of the end edge in degrees.
    #[must_use]
    pub fn end_angle(&self) -> f64 {
        self.rotation + self.angle / 2.0
    }

    /// The sector's two edge points `(start, end)`.
    #[must_use]
    pub fn edge_points(&self, center: Point) -> (Point, Point) {
        (
            polar(center, self.distance, self.start_angle()),
            polar(center, self.distance, self.end_angle()),
        )
    }

    #[must_use]
    pub fn handles(&self, center: Point) -> FovHandles {
        let (start, end) = self.edge_points(center);
        FovHandles { aim: polar(center, self.distance, self.rotation), start, end }
    }

    /// SVG path of the pie slice: `M c L start A d,d 0 large 1 end Z`.
    #[must_use]
    pub fn sector_path(&self, center: Point) -> String {
        let (start, end) = self.edge_points(center);
        let large_arc = u8::from(self.angle > 180.0);
        format!(
            "M {:.2} {:.2} L {:.2} {:.2} A {:.2},{:.2} 0 {large_arc} 1 {:.2} {:.2} Z",
            center.x, center.y, start.x, start.y, self.distance, self.distance, end.x, end.y,
        )
    }

    /// Apply a handle drag with the cursor at `cursor`.
    ///
    /// A cursor sitting exactly on the center has no direction; the FOV is
    /// returned unchanged in that case.
    #[must_use]
    pub fn drag(&self, handle: FovHandle, center: Point, cursor: Point) -> Self {
        let dx = cursor.x - center.x;
        let dy = cursor.y - center.y;
        if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
            return *self;
        }
        let cursor_angle = dy.atan2(dx).to_degrees();

        match handle {
            FovHandle::Aim => Self { angle: self.angle, distance: dx.hypot(dy), rotation: cursor_angle },
            FovHandle::Start => {
                let end = self.end_angle();
                let angle = clamp_angle((end - cursor_angle).rem_euclid(360.0));
                Self { angle, distance: self.distance, rotation: end - angle / 2.0 }
            }
            FovHandle::End => {
                let start = self.start_angle();
                let angle = clamp_angle((cursor_angle - start).rem_euclid(360.0));
                Self { angle, distance: self.distance, rotation: start + angle / 2.0 }
            }
        }
    }
}

fn clamp_angle(angle: f64) -> f64 {
    angle.clamp(0.0, MAX_FOV_ANGLE)
}

fn polar(center: Point, radius: f64, deg: f64) -> Point {
    let rad = deg.to_radians();
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}
