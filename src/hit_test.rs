#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::DeviceType;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn rect_at(x: f64, y: f64, w: f64, h: f64) -> Edit {
    let mut e = Edit::text(pt(x, y));
    e.frame.width = w;
    e.frame.height = h;
    e.frame.page_index = Some(0);
    e
}

// =============================================================
// Bodies
// =============================================================

#[test]
fn miss_returns_none() {
    let a = rect_at(0.0, 0.0, 50.0, 50.0);
    assert!(hit_test(pt(200.0, 200.0), &[&a], &[], 1.0).is_none());
}

#[test]
fn topmost_edit_wins() {
    let below = rect_at(0.0, 0.0, 100.0, 100.0);
    let above = rect_at(50.0, 50.0, 100.0, 100.0);
    let hit = hit_test(pt(75.0, 75.0), &[&below, &above], &[], 1.0).unwrap();
    assert_eq!(hit, Hit { edit_id: above.id(), part: HitPart::Body });
}

#[test]
fn rotated_body_uses_local_frame() {
    let mut bar = rect_at(0.0, 45.0, 100.0, 10.0);
    bar.frame.rotation = 90.0;
    // Rotated a quarter turn the bar stands vertically through (50, 50).
    assert!(hit_test(pt(50.0, 5.0), &[&bar], &[], 1.0).is_some());
    assert!(hit_test(pt(5.0, 50.0), &[&bar], &[], 1.0).is_none());
}

// =============================================================
// Handles
// =============================================================

#[test]
fn corner_handle_requires_single_selection() {
    let a = rect_at(0.0, 0.0, 50.0, 50.0);
    let b = rect_at(200.0, 0.0, 50.0, 50.0);
    let near_corner = pt(53.0, 53.0);

    let hit = hit_test(near_corner, &[&a, &b], &[a.id()], 1.0).unwrap();
    assert_eq!(hit.part, HitPart::Resize(Corner::BottomRight));

    assert!(hit_test(near_corner, &[&a, &b], &[a.id(), b.id()], 1.0).is_none());
}

#[test]
fn handle_slop_scales_with_zoom() {
    let a = rect_at(0.0, 0.0, 50.0, 50.0);
    // 6 document units away: inside 8px at zoom 1, outside at zoom 2 (4 units).
    let p = pt(56.0, 50.0);
    assert!(hit_test(p, &[&a], &[a.id()], 1.0).is_some());
    assert!(hit_test(p, &[&a], &[a.id()], 2.0).is_none());
}

#[test]
fn fov_handles_only_for_selected_camera() {
    let mut cam = Edit::device(DeviceType::Camera, pt(100.0, 100.0), "Camera 1");
    cam.frame.page_index = Some(0);
    // Default aim handle sits 100 units straight up from the center.
    let aim = pt(100.0, 0.0);

    let hit = hit_test(aim, &[&cam], &[cam.id()], 1.0).unwrap();
    assert_eq!(hit.part, HitPart::Fov(FovHandle::Aim));
    assert!(hit_test(aim, &[&cam], &[], 1.0).is_none());

    let mut door = Edit::device(DeviceType::AccessDoor, pt(100.0, 100.0), "Door 1");
    door.frame.page_index = Some(0);
    assert!(hit_test(aim, &[&door], &[door.id()], 1.0).is_none());
}

#[test]
fn fov_start_and_end_handles_are_distinct() {
    let cam = Edit::device(DeviceType::Camera, pt(0.0, 0.0), "Camera 1");
    let handles = CameraFov::of(&cam).unwrap().handles(cam.frame.center());
    let start = hit_test(handles.start, &[&cam], &[cam.id()], 1.0).unwrap();
    let end = hit_test(handles.end, &[&cam], &[cam.id()], 1.0).unwrap();
    assert_eq!(start.part, HitPart::Fov(FovHandle::Start));
    assert_eq!(end.part, HitPart::Fov(FovHandle::End));
}

// =============================================================
// Marquee
// =============================================================

#[test]
fn marquee_selects_intersecting_bounds() {
    let a = rect_at(0.0, 0.0, 20.0, 20.0);
    let b = rect_at(100.0, 100.0, 20.0, 20.0);
    let marquee = Rect::from_corners(pt(10.0, 10.0), pt(50.0, 50.0));
    assert_eq!(marquee_hits(&marquee, &[&a, &b]), vec![a.id()]);
}

#[test]
fn to_local_is_identity_without_rotation() {
    let a = rect_at(0.0, 0.0, 20.0, 20.0);
    assert_eq!(to_local(&a.frame, pt(3.0, 4.0)), pt(3.0, 4.0));
}
