#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point ---

#[test]
fn point_distance_is_euclidean() {
    assert!(approx_eq(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
}

#[test]
fn point_midpoint() {
    let m = Point::new(-2.0, 4.0).midpoint(Point::new(6.0, 0.0));
    assert!(point_approx_eq(m, Point::new(2.0, 2.0)));
}

#[test]
fn point_is_finite_rejects_nan() {
    assert!(Point::new(1.0, 2.0).is_finite());
    assert!(!Point::new(f64::NAN, 2.0).is_finite());
    assert!(!Point::new(1.0, f64::INFINITY).is_finite());
}

// --- Defaults ---

#[test]
fn default_transform_is_identity() {
    let t = ViewTransform::default();
    assert_eq!(t.x, 0.0);
    assert_eq!(t.y, 0.0);
    assert_eq!(t.scale, 1.0);
    assert_eq!(t.rotation, 0.0);
    assert!(!t.flip_x);
    assert!(!t.flip_y);
}

#[test]
fn identity_maps_points_unchanged() {
    let t = ViewTransform::default();
    let p = Point::new(12.5, -7.0);
    assert!(point_approx_eq(t.image_to_viewport(p), p));
    assert!(point_approx_eq(t.viewport_to_image(p), p));
}

// --- Rotation normalization ---

#[test]
fn normalize_rotation_keeps_in_range_values() {
    assert!(approx_eq(normalize_rotation(45.0), 45.0));
    assert!(approx_eq(normalize_rotation(-180.0), -180.0));
}

#[test]
fn normalize_rotation_wraps_180_to_negative() {
    assert!(approx_eq(normalize_rotation(180.0), -180.0));
}

#[test]
fn normalize_rotation_wraps_large_angles() {
    assert!(approx_eq(normalize_rotation(370.0), 10.0));
    assert!(approx_eq(normalize_rotation(-190.0), 170.0));
    assert!(approx_eq(normalize_rotation(720.0 + 90.0), 90.0));
}

#[test]
fn normalize_rotation_non_finite_is_zero() {
    assert_eq!(normalize_rotation(f64::NAN), 0.0);
    assert_eq!(normalize_rotation(f64::INFINITY), 0.0);
}

#[test]
fn rotated_by_accumulates_and_normalizes() {
    let t = ViewTransform::default().with_rotation(170.0).rotated_by(20.0);
    assert!(approx_eq(t.rotation, -170.0));
}

// --- Scale floor ---

#[test]
fn scale_floor_raises_small_scale() {
    let t = ViewTransform { scale: 0.2, ..Default::default() }.with_scale_floor(0.5);
    assert!(approx_eq(t.scale, 0.5));
}

#[test]
fn scale_floor_never_below_min_scale() {
    let t = ViewTransform { scale: 0.0, ..Default::default() }.with_scale_floor(0.0);
    assert!(approx_eq(t.scale, MIN_SCALE));
}

#[test]
fn scale_floor_keeps_larger_scale() {
    let t = ViewTransform { scale: 3.0, ..Default::default() }.with_scale_floor(0.5);
    assert!(approx_eq(t.scale, 3.0));
}

// --- Anchored rescale ---

#[test]
fn rescaled_about_keeps_anchor_image_point_fixed() {
    let t = ViewTransform { x: 30.0, y: -12.0, scale: 1.5, rotation: 25.0, ..Default::default() };
    let anchor = Point::new(-40.0, 75.0);
    let before = t.viewport_to_image(anchor);
    let after = t.rescaled_about(anchor, 3.7).viewport_to_image(anchor);
    assert!((before.x - after.x).abs() < 1e-6);
    assert!((before.y - after.y).abs() < 1e-6);
}

#[test]
fn rescaled_about_clamps_to_min_scale() {
    let t = ViewTransform::default().rescaled_about(Point::new(10.0, 10.0), 0.0001);
    assert!(approx_eq(t.scale, MIN_SCALE));
}

#[test]
fn rescaled_about_origin_anchor_only_scales_translation() {
    let t = ViewTransform { x: 10.0, y: 20.0, scale: 1.0, ..Default::default() };
    let r = t.rescaled_about(Point::new(0.0, 0.0), 2.0);
    assert!(approx_eq(r.x, 20.0));
    assert!(approx_eq(r.y, 40.0));
}

#[test]
fn rescaled_about_keeps_anchor_under_rotation_and_flip() {
    let t = ViewTransform { x: 5.0, y: 5.0, scale: 2.0, rotation: 40.0, flip_x: false, flip_y: true };
    let anchor = Point::new(20.0, -8.0);
    let image_pt = t.viewport_to_image(anchor);
    let r = t.rescaled_about(anchor, 4.0);
    assert!(point_approx_eq(r.image_to_viewport(image_pt), anchor));
}

// --- Mapping ---

#[test]
fn image_viewport_round_trip_with_rotation_and_flip() {
    let t = ViewTransform { x: 14.0, y: -3.0, scale: 2.5, rotation: -63.0, flip_x: true, flip_y: false };
    let p = Point::new(17.0, 41.0);
    assert!(point_approx_eq(t.viewport_to_image(t.image_to_viewport(p)), p));
}

#[test]
fn rotation_90_maps_x_axis_to_y_axis() {
    let t = ViewTransform::default().with_rotation(90.0);
    let q = t.image_to_viewport(Point::new(1.0, 0.0));
    assert!(point_approx_eq(q, Point::new(0.0, 1.0)));
}

#[test]
fn flip_x_mirrors_horizontally() {
    let t = ViewTransform::default().flipped_x();
    let q = t.image_to_viewport(Point::new(5.0, 2.0));
    assert!(point_approx_eq(q, Point::new(-5.0, 2.0)));
}

#[test]
fn flip_twice_restores() {
    let t = ViewTransform::default().flipped_y().flipped_y();
    assert!(!t.flip_y);
}

#[test]
fn css_includes_every_component() {
    let t = ViewTransform { x: 4.0, y: -2.0, scale: 1.5, rotation: 30.0, flip_x: true, flip_y: false };
    assert_eq!(t.to_css(), "translate(4px, -2px) rotate(30deg) scale(-1.5, 1.5)");
}
