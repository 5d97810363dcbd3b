use image::{Rgba as ImageRgba, RgbaImage};

use super::*;
use crate::stroke::{Rgba, StrokePoint};

const SIZE: PixelSize = PixelSize::new(32, 32);

fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, ImageRgba(color));
    encode_png(&DynamicImage::ImageRgba8(img)).unwrap()
}

fn stroke(kind: StrokeKind, from: (f64, f64), to: (f64, f64), width: f64) -> Stroke {
    let color = (kind == StrokeKind::Color).then_some(Rgba::opaque(255, 0, 0));
    let points = vec![StrokePoint::new(from.0, from.1, 0.0), StrokePoint::new(to.0, to.1, 16.0)];
    Stroke::from_points(kind, color, width, points).unwrap()
}

fn field_image(field: &str) -> RgbaImage {
    let bytes = decode_field(field).unwrap();
    image::load_from_memory(&bytes).unwrap().to_rgba8()
}

fn transparent_pixels(img: &RgbaImage) -> usize {
    img.pixels().filter(|p| p.0[3] < 128).count()
}

// =============================================================
// stretch_to / rescale_result
// =============================================================

#[test]
fn stretch_reports_original_size() {
    let (png, original) = stretch_to(&solid_png(40, 20, [0, 200, 0, 255]), SIZE).unwrap();
    assert_eq!(original, PixelSize::new(40, 20));
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (32, 32));
    let [r, g, b, a] = img.get_pixel(16, 16).0;
    assert!(r < 3 && g.abs_diff(200) < 3 && b < 3 && a == 255);
}

#[test]
fn stretch_fills_transparency_with_white() {
    let (png, _) = stretch_to(&solid_png(8, 8, [0, 0, 0, 0]), SIZE).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255, 255]);
}

#[test]
fn stretch_rejects_garbage() {
    assert!(matches!(stretch_to(b"not an image", SIZE), Err(MaskError::Decode(_))));
}

#[test]
fn rescale_restores_original_dimensions() {
    let result = solid_png(32, 32, [10, 20, 30, 255]);
    let out = rescale_result(&result, PixelSize::new(40, 20)).unwrap();
    let img = image::load_from_memory(&out).unwrap();
    assert_eq!((img.width(), img.height()), (40, 20));
}

#[test]
fn rescale_rejects_zero_size() {
    let result = solid_png(4, 4, [0, 0, 0, 255]);
    assert!(matches!(rescale_result(&result, PixelSize::new(0, 10)), Err(MaskError::InvalidDimension { .. })));
}

// =============================================================
// binary_mask_file
// =============================================================

#[test]
fn mask_file_flattens_onto_black_at_size() {
    // Left half opaque white, right half fully transparent.
    let mut mask = RgbaImage::from_pixel(8, 8, ImageRgba([0, 0, 0, 0]));
    for y in 0..8 {
        for x in 0..4 {
            mask.put_pixel(x, y, ImageRgba([255, 255, 255, 255]));
        }
    }
    let bytes = encode_png(&DynamicImage::ImageRgba8(mask)).unwrap();

    let upload = binary_mask_file(&bytes, SIZE).unwrap();
    assert_eq!(upload.filename, "mask.png");
    let img = image::load_from_memory(&upload.bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (32, 32));
    assert_eq!(img.get_pixel(4, 16).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(28, 16).0, [0, 0, 0, 255]);
    assert!(img.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn mask_file_rejects_zero_size_and_garbage() {
    let bytes = solid_png(4, 4, [255, 255, 255, 255]);
    assert!(matches!(
        binary_mask_file(&bytes, PixelSize::new(0, 512)),
        Err(MaskError::InvalidDimension { role: "mask", .. })
    ));
    assert!(matches!(binary_mask_file(b"nope", SIZE), Err(MaskError::Decode(_))));
}

// =============================================================
// QuillPayload
// =============================================================

#[test]
fn build_without_color_strokes() {
    let photo = solid_png(40, 20, [0, 200, 0, 255]);
    let strokes = [stroke(StrokeKind::Add, (5.0, 10.0), (35.0, 10.0), 6.0)];
    let payload = QuillPayload::build(&photo, &strokes, SIZE).unwrap();

    assert_eq!(payload.original_size, PixelSize::new(40, 20));
    assert!(payload.add_color_image.is_empty());
    assert!(payload.positive_prompt.is_empty());

    let total = field_image(&payload.total_mask);
    let add = field_image(&payload.add_edge_image);
    let remove = field_image(&payload.remove_edge_image);
    assert_eq!(total.dimensions(), (32, 32));
    assert!(transparent_pixels(&add) > 0);
    assert_eq!(transparent_pixels(&add), transparent_pixels(&total));
    assert_eq!(transparent_pixels(&remove), 0);
    assert_eq!(field_image(&payload.original_image).dimensions(), (32, 32));
}

#[test]
fn build_splits_strokes_by_kind() {
    let photo = solid_png(64, 64, [255, 255, 255, 255]);
    let strokes = [
        stroke(StrokeKind::Add, (4.0, 10.0), (60.0, 10.0), 6.0),
        stroke(StrokeKind::Subtract, (4.0, 50.0), (60.0, 50.0), 6.0),
        stroke(StrokeKind::Color, (4.0, 30.0), (60.0, 30.0), 6.0),
    ];
    let payload = QuillPayload::build(&photo, &strokes, SIZE).unwrap();

    let total = field_image(&payload.total_mask);
    let add = field_image(&payload.add_edge_image);
    let remove = field_image(&payload.remove_edge_image);
    // Source 64 -> 32: rows 10/30/50 land on rows 5/15/25.
    assert!(add.get_pixel(16, 5).0[3] < 128);
    assert!(add.get_pixel(16, 25).0[3] > 128);
    assert!(remove.get_pixel(16, 25).0[3] < 128);
    assert!(remove.get_pixel(16, 5).0[3] > 128);
    for y in [5, 15, 25] {
        assert!(total.get_pixel(16, y).0[3] < 128, "total mask row {y}");
    }

    let color = field_image(&payload.add_color_image);
    assert_eq!(color.dimensions(), (32, 32));
    let [r, g, _, _] = color.get_pixel(16, 15).0;
    assert!(r > 200 && g < 60);
    // Away from the stroke the photo shows through.
    assert!(color.get_pixel(16, 2).0[1] > 200);
}

#[test]
fn build_propagates_decode_errors() {
    let strokes = [stroke(StrokeKind::Add, (0.0, 0.0), (10.0, 10.0), 2.0)];
    assert!(matches!(QuillPayload::build(&[0, 1, 2], &strokes, SIZE), Err(MaskError::Decode(_))));
}

#[test]
fn form_fields_are_in_wire_order() {
    let photo = solid_png(8, 8, [0, 0, 0, 255]);
    let payload = QuillPayload::build(&photo, &[], SIZE).unwrap().with_prompts("a cat", "blurry");
    let names: Vec<&str> = payload.form_fields().iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        [
            "original_image",
            "total_mask",
            "add_color_image",
            "add_edge_image",
            "remove_edge_image",
            "positive_prompt",
            "negative_prompt"
        ]
    );
    assert_eq!(payload.form_fields()[5].1, "a cat");
}

#[test]
fn json_omits_original_size() {
    let photo = solid_png(8, 8, [0, 0, 0, 255]);
    let payload = QuillPayload::build(&photo, &[], SIZE).unwrap();
    let value = serde_json::to_value(&payload).unwrap();
    assert!(value.get("original_size").is_none());
    assert_eq!(value["negative_prompt"], "");
    assert!(value["total_mask"].as_str().is_some_and(|s| !s.is_empty()));
}

#[test]
fn decode_field_rejects_invalid_base64() {
    assert!(matches!(decode_field("@@@"), Err(MaskError::Decode(_))));
}
