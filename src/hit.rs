//! Hit-testing edits on the current page.
//!
//! Handles of the single selected edit win over bodies, and bodies are tested
//! top-most first (reverse draw order). Handle slop is a fixed screen radius,
//! so it is converted to document units with the current zoom.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{Edit, EditId, Frame, Rect};
use crate::fov::{CameraFov, FovHandle};
use crate::manipulate::Corner;

/// Which part of an edit was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Resize(Corner),
    Fov(FovHandle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub edit_id: EditId,
    pub part: HitPart,
}

/// Find what lies under `doc_pt`.
///
/// `edits` are the placed edits of the current page in draw order. Handles are
/// only offered when exactly one edit is selected; FOV handles additionally
/// require that edit to be a camera.
#[must_use]
pub fn hit_test(doc_pt: Point, edits: &[&Edit], selection: &[EditId], zoom: f64) -> Option<Hit> {
    let slop = HANDLE_RADIUS_PX / zoom;

    if let [selected] = selection {
        if let Some(edit) = edits.iter().find(|e| e.id() == *selected) {
            if let Some(part) = handle_at(edit, doc_pt, slop) {
                return Some(Hit { edit_id: edit.id(), part });
            }
        }
    }

    edits
        .iter()
        .rev()
        .find(|e| body_contains(&e.frame, doc_pt))
        .map(|e| Hit { edit_id: e.id(), part: HitPart::Body })
}

fn handle_at(edit: &Edit, doc_pt: Point, slop: f64) -> Option<HitPart> {
    let center = edit.frame.center();
    if let Some(fov) = CameraFov::of(edit) {
        let handles = fov.handles(center);
        let candidates = [(FovHandle::Aim, handles.aim), (FovHandle::Start, handles.start), (FovHandle::End, handles.end)];
        if let Some((handle, _)) = candidates.iter().find(|(_, p)| p.distance_to(doc_pt) <= slop) {
            return Some(HitPart::Fov(*handle));
        }
    }

    let local = to_local(&edit.frame, doc_pt);
    Corner::ALL
        .iter()
        .find(|c| {
            let (x, y) = c.position(&edit.frame);
            Point::new(x, y).distance_to(local) <= slop
        })
        .map(|c| HitPart::Resize(*c))
}

/// Whether `doc_pt` lies inside the frame, honoring its rotation.
#[must_use]
pub fn body_contains(frame: &Frame, doc_pt: Point) -> bool {
    frame.bounds().contains(to_local(frame, doc_pt))
}

/// Undo the frame's rotation about its center, mapping `doc_pt` into the
/// frame's unrotated coordinate system.
#[must_use]
pub fn to_local(frame: &Frame, doc_pt: Point) -> Point {
    if frame.rotation == 0.0 {
        return doc_pt;
    }
    let c = frame.center();
    let (sin, cos) = (-frame.rotation).to_radians().sin_cos();
    let (dx, dy) = (doc_pt.x - c.x, doc_pt.y - c.y);
    Point::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos)
}

/// Ids of edits whose bounds intersect the marquee rectangle.
#[must_use]
pub fn marquee_hits(marquee: &Rect, edits: &[&Edit]) -> Vec<EditId> {
    edits.iter().filter(|e| e.frame.bounds().intersects(marquee)).map(|e| e.id()).collect()
}
