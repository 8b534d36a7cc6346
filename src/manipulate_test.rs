#![allow(clippy::float_cmp)]

use super::*;

fn frame(x: f64, y: f64, w: f64, h: f64) -> Frame {
    Frame::new(x, y, w, h)
}

// =============================================================
// translate
// =============================================================

#[test]
fn translate_moves_origin_only() {
    let f = frame(10.0, 20.0, 30.0, 40.0);
    let moved = translate(&f, 5.0, -5.0);
    assert_eq!((moved.x, moved.y, moved.width, moved.height), (15.0, 15.0, 30.0, 40.0));
    assert_eq!(moved.id, f.id);
}

// =============================================================
// Independent resize
// =============================================================

#[test]
fn bottom_right_grows_size_only() {
    let f = frame(0.0, 0.0, 100.0, 50.0);
    let r = resize(&f, Corner::BottomRight, 20.0, 10.0, false);
    assert_eq!((r.x, r.y, r.width, r.height), (0.0, 0.0, 120.0, 60.0));
}

#[test]
fn top_left_moves_origin_and_shrinks() {
    let f = frame(0.0, 0.0, 100.0, 50.0);
    let r = resize(&f, Corner::TopLeft, 20.0, 10.0, false);
    assert_eq!((r.x, r.y, r.width, r.height), (20.0, 10.0, 80.0, 40.0));
}

#[test]
fn top_right_moves_top_edge_only() {
    let f = frame(0.0, 0.0, 100.0, 50.0);
    let r = resize(&f, Corner::TopRight, 20.0, 10.0, false);
    assert_eq!((r.x, r.y, r.width, r.height), (0.0, 10.0, 120.0, 40.0));
}

#[test]
fn bottom_left_moves_left_edge_only() {
    let f = frame(0.0, 0.0, 100.0, 50.0);
    let r = resize(&f, Corner::BottomLeft, 20.0, 10.0, false);
    assert_eq!((r.x, r.y, r.width, r.height), (20.0, 0.0, 80.0, 60.0));
}

#[test]
fn resize_clamps_to_minimum_and_anchors_opposite_corner() {
    let f = frame(0.0, 0.0, 100.0, 50.0);
    let r = resize(&f, Corner::TopLeft, 500.0, 500.0, false);
    assert_eq!(r.width, MIN_EDIT_SIZE);
    assert_eq!(r.height, MIN_EDIT_SIZE);
    assert_eq!(r.x + r.width, 100.0);
    assert_eq!(r.y + r.height, 50.0);
}

#[test]
fn resize_never_goes_below_minimum_from_any_corner() {
    let f = frame(10.0, 10.0, 40.0, 40.0);
    for corner in Corner::ALL {
        for (dx, dy) in [(-300.0, -300.0), (300.0, 300.0), (-300.0, 300.0), (300.0, -300.0)] {
            for square in [false, true] {
                let r = resize(&f, corner, dx, dy, square);
                assert!(r.width >= MIN_EDIT_SIZE && r.height >= MIN_EDIT_SIZE);
            }
        }
    }
}

// =============================================================
// Square resize
// =============================================================

#[test]
fn square_resize_averages_axis_deltas() {
    let f = frame(0.0, 0.0, 24.0, 24.0);
    let r = resize(&f, Corner::BottomRight, 10.0, 4.0, true);
    assert_eq!((r.width, r.height), (31.0, 31.0));
    assert_eq!((r.x, r.y), (0.0, 0.0));
}

#[test]
fn square_resize_top_left_keeps_bottom_right_fixed() {
    let f = frame(100.0, 100.0, 24.0, 24.0);
    let r = resize(&f, Corner::TopLeft, -6.0, -10.0, true);
    assert_eq!((r.width, r.height), (32.0, 32.0));
    assert_eq!((r.x + r.width, r.y + r.height), (124.0, 124.0));
}

#[test]
fn square_resize_always_square_from_every_corner() {
    let f = frame(5.0, 5.0, 24.0, 24.0);
    for corner in Corner::ALL {
        for (dx, dy) in [(3.0, 17.0), (-9.0, 2.5), (40.0, -40.0), (-1.0, -100.0)] {
            let r = resize(&f, corner, dx, dy, true);
            assert_eq!(r.width, r.height, "{corner:?} {dx} {dy}");
        }
    }
}

// =============================================================
// Rotation
// =============================================================

#[test]
fn normalize_degrees_wraps_into_range() {
    assert_eq!(normalize_degrees(370.0), 10.0);
    assert_eq!(normalize_degrees(-90.0), 270.0);
    assert_eq!(normalize_degrees(360.0), 0.0);
}

#[test]
fn rotate_accumulates_and_wraps() {
    let f = Frame { rotation: 300.0, ..frame(0.0, 0.0, 10.0, 10.0) };
    assert_eq!(rotate(&f, 90.0).rotation, 30.0);
}

#[test]
fn corner_position_reports_handle_location() {
    let f = frame(10.0, 20.0, 30.0, 40.0);
    assert_eq!(Corner::TopLeft.position(&f), (10.0, 20.0));
    assert_eq!(Corner::BottomRight.position(&f), (40.0, 60.0));
    assert_eq!(Corner::TopRight.position(&f), (40.0, 20.0));
    assert_eq!(Corner::BottomLeft.position(&f), (10.0, 60.0));
}
