use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn size_approx_eq(a: Size, b: Size) -> bool {
    approx_eq(a.width, b.width) && approx_eq(a.height, b.height)
}

fn area(r: Rect) -> f64 {
    r.width * r.height
}

// =============================================================
// rotated_bounding_box
// =============================================================

#[test]
fn bbox_zero_angle_is_input() {
    assert!(size_approx_eq(rotated_bounding_box(200.0, 100.0, 0.0), Size::new(200.0, 100.0)));
}

#[test]
fn bbox_quarter_turn_swaps_axes() {
    assert!(size_approx_eq(rotated_bounding_box(200.0, 100.0, 90.0), Size::new(100.0, 200.0)));
}

#[test]
fn bbox_is_periodic_in_full_turns() {
    for angle in [-170.0, -45.0, 0.0, 12.5, 33.0, 90.0, 179.0] {
        let a = rotated_bounding_box(320.0, 180.0, angle);
        let b = rotated_bounding_box(320.0, 180.0, angle + 360.0);
        assert!((a.width - b.width).abs() < 1e-6, "angle {angle}");
        assert!((a.height - b.height).abs() < 1e-6, "angle {angle}");
    }
}

#[test]
fn bbox_45_degrees_of_square() {
    let b = rotated_bounding_box(100.0, 100.0, 45.0);
    let expected = 100.0 * std::f64::consts::SQRT_2;
    assert!((b.width - expected).abs() < 1e-6);
    assert!((b.height - expected).abs() < 1e-6);
}

#[test]
fn bbox_is_symmetric_in_angle_sign() {
    let a = rotated_bounding_box(300.0, 120.0, 30.0);
    let b = rotated_bounding_box(300.0, 120.0, -30.0);
    assert!(size_approx_eq(a, b));
}

// =============================================================
// fit_dimensions
// =============================================================

#[test]
fn fit_fills_width_when_height_allows() {
    let s = fit_dimensions(1000.0, 500.0, 400.0, 400.0);
    assert!(size_approx_eq(s, Size::new(400.0, 200.0)));
}

#[test]
fn fit_falls_back_to_height_constraint() {
    let s = fit_dimensions(500.0, 1000.0, 400.0, 400.0);
    assert!(size_approx_eq(s, Size::new(200.0, 400.0)));
}

#[test]
fn fit_upscales_small_images() {
    let s = fit_dimensions(10.0, 10.0, 300.0, 600.0);
    assert!(size_approx_eq(s, Size::new(300.0, 300.0)));
}

#[test]
fn fit_degenerate_natural_size_is_zero() {
    assert_eq!(fit_dimensions(0.0, 100.0, 300.0, 300.0), Size::ZERO);
    assert_eq!(fit_dimensions(100.0, -1.0, 300.0, 300.0), Size::ZERO);
    assert_eq!(fit_dimensions(f64::NAN, 100.0, 300.0, 300.0), Size::ZERO);
}

// =============================================================
// required_cover_scale
// =============================================================

#[test]
fn cover_scale_takes_larger_ratio() {
    assert!(approx_eq(required_cover_scale(300.0, 100.0, 200.0, 200.0), 1.5));
    assert!(approx_eq(required_cover_scale(100.0, 300.0, 200.0, 200.0), 1.5));
}

#[test]
fn cover_scale_below_one_when_crop_is_smaller() {
    assert!(approx_eq(required_cover_scale(50.0, 40.0, 200.0, 100.0), 0.4));
}

// =============================================================
// overlay_pieces
// =============================================================

#[test]
fn overlay_pieces_cover_container_minus_crop() {
    let container = Size::new(400.0, 300.0);
    let crop = Rect::new(50.0, 40.0, 200.0, 150.0);
    let p = overlay_pieces(crop, container);

    assert_eq!(p.top, Rect::new(0.0, 0.0, 400.0, 40.0));
    assert_eq!(p.bottom, Rect::new(0.0, 190.0, 400.0, 110.0));
    assert_eq!(p.left, Rect::new(0.0, 40.0, 50.0, 150.0));
    assert_eq!(p.right, Rect::new(250.0, 40.0, 150.0, 150.0));

    let dimmed = area(p.top) + area(p.bottom) + area(p.left) + area(p.right);
    assert!(approx_eq(dimmed, 400.0 * 300.0 - area(crop)));
}

#[test]
fn overlay_pieces_full_crop_leaves_empty_pieces() {
    let container = Size::new(400.0, 300.0);
    let p = overlay_pieces(Rect::new(0.0, 0.0, 400.0, 300.0), container);
    assert!(approx_eq(area(p.top), 0.0));
    assert!(approx_eq(area(p.bottom), 0.0));
    assert!(approx_eq(area(p.left), 0.0));
    assert!(approx_eq(area(p.right), 0.0));
}

#[test]
fn overlay_pieces_never_negative() {
    let container = Size::new(100.0, 100.0);
    let p = overlay_pieces(Rect::new(-20.0, -10.0, 150.0, 130.0), container);
    for piece in [p.top, p.bottom, p.left, p.right] {
        assert!(piece.width >= 0.0);
        assert!(piece.height >= 0.0);
    }
}

// =============================================================
// crop_outside_image
// =============================================================

#[test]
fn crop_inside_image_is_allowed() {
    let image = Rect::new(10.0, 10.0, 300.0, 200.0);
    assert!(!crop_outside_image(Rect::new(20.0, 20.0, 100.0, 100.0), image));
    assert!(!crop_outside_image(image, image));
}

#[test]
fn crop_past_any_edge_is_outside() {
    let image = Rect::new(10.0, 10.0, 300.0, 200.0);
    assert!(crop_outside_image(Rect::new(5.0, 20.0, 100.0, 100.0), image));
    assert!(crop_outside_image(Rect::new(20.0, 5.0, 100.0, 100.0), image));
    assert!(crop_outside_image(Rect::new(250.0, 20.0, 100.0, 100.0), image));
    assert!(crop_outside_image(Rect::new(20.0, 150.0, 100.0, 100.0), image));
}
