use super::*;

/// Small layout without corner rounding so pixel assertions stay exact.
fn test_layout() -> CompareLayout {
    CompareLayout {
        content_width: 42.0,
        cell_gap: 2.0,
        render_scale: 1.0,
        reference_cell_width: 20.0,
        reference_corner_radius: 0.0,
        reference_label_font_size: 8.0,
        reference_label_strip_height: 10.0,
    }
}

fn compositor() -> CompareCompositor {
    CompareCompositor::new(test_layout(), CompositorConfig::default())
}

fn red_2x1() -> ImageRgba {
    ImageRgba::from_premul_parts(2, 1, vec![255, 0, 0, 255, 255, 0, 0, 255]).unwrap()
}

fn px(img: &ImageRgba, x: u32, y: u32) -> [u8; 4] {
    let off = (y * img.width + x) as usize * 4;
    let p = &img.rgba8_premul[off..off + 4];
    [p[0], p[1], p[2], p[3]]
}

#[test]
fn both_sides_absent_is_an_error() {
    let err = compositor()
        .composite(
            None,
            None,
            &CompareSideParams::default(),
            &CompareSideParams::default(),
            None,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, RelensError::Composition(_)));
}

#[test]
fn single_side_leaves_the_other_cell_as_background() {
    let left = red_2x1();
    let side = CompareSideParams {
        source_cell_width: 20.0,
        ..CompareSideParams::default()
    };
    let out = compositor()
        .composite(Some(&left), None, &side, &side, None, None)
        .unwrap();
    assert_eq!((out.width, out.height), (42, 27));
    // Right cell interior stays page-background white.
    assert_eq!(px(&out, 32, 13), [255, 255, 255, 255]);
}

#[test]
fn fit_mode_letterboxes_with_background() {
    let left = red_2x1();
    let side = CompareSideParams {
        source_cell_width: 20.0,
        ..CompareSideParams::default()
    };
    let out = compositor()
        .composite(Some(&left), None, &side, &side, None, None)
        .unwrap();
    // A 2:1 source fits a 20x27 cell as a 20x10 band centered vertically.
    assert_eq!(px(&out, 10, 0), [255, 255, 255, 255]);
    assert_eq!(px(&out, 10, 13), [255, 0, 0, 255]);
    assert_eq!(px(&out, 10, 26), [255, 255, 255, 255]);
}

#[test]
fn fill_mode_covers_the_whole_cell() {
    let config = CompositorConfig {
        fit_mode: FitMode::Fill,
        ..CompositorConfig::default()
    };
    let side = CompareSideParams {
        source_cell_width: 20.0,
        ..CompareSideParams::default()
    };
    let left = red_2x1();
    let out = CompareCompositor::new(test_layout(), config)
        .composite(Some(&left), None, &side, &side, None, None)
        .unwrap();
    assert_eq!(px(&out, 0, 0), [255, 0, 0, 255]);
    assert_eq!(px(&out, 19, 26), [255, 0, 0, 255]);
}

#[test]
fn empty_labels_reserve_no_strip() {
    let left = red_2x1();
    let side = CompareSideParams {
        source_cell_width: 20.0,
        ..CompareSideParams::default()
    };
    let out = compositor()
        .composite(Some(&left), None, &side, &side, Some(""), Some(""))
        .unwrap();
    assert_eq!(out.height, 27);
}

#[test]
fn labels_without_font_leave_strip_as_background() {
    let left = red_2x1();
    let side = CompareSideParams {
        source_cell_width: 20.0,
        ..CompareSideParams::default()
    };
    let out = compositor()
        .composite(Some(&left), None, &side, &side, Some("Jan"), None)
        .unwrap();
    assert_eq!(out.height, 37);
    assert_eq!(px(&out, 10, 31), [255, 255, 255, 255]);
}

#[test]
fn invalid_source_cell_width_is_rejected() {
    let left = red_2x1();
    let side = CompareSideParams {
        source_cell_width: 0.0,
        ..CompareSideParams::default()
    };
    let err = compositor()
        .composite(Some(&left), None, &side, &side, None, None)
        .unwrap_err();
    assert!(matches!(err, RelensError::Composition(_)));
}

#[test]
fn transform_failures_propagate() {
    let left = red_2x1();
    let side = CompareSideParams {
        transform: TransformParams {
            scale: f64::NAN,
            ..TransformParams::identity()
        },
        source_cell_width: 20.0,
    };
    let err = compositor()
        .composite(Some(&left), None, &side, &side, None, None)
        .unwrap_err();
    assert!(matches!(err, RelensError::InvalidTransform(_)));
}

#[test]
fn round_corners_masks_outer_corner_pixels() {
    let mut cell = vec![255u8; 8 * 8 * 4];
    round_corners(&mut cell, 8, 8, 3.0);
    // The very corner is fully outside the arc.
    assert_eq!(&cell[0..4], &[0, 0, 0, 0]);
    // The interior is untouched.
    let center = (4 * 8 + 4) * 4;
    assert_eq!(&cell[center..center + 4], &[255, 255, 255, 255]);
}

#[test]
fn copy_clipped_crops_negative_origins() {
    let src = ImageRgba::from_premul_parts(2, 2, vec![9u8; 16]).unwrap();
    let mut dst = vec![0u8; 2 * 2 * 4];
    copy_clipped(&mut dst, 2, 2, &src, -1, -1);
    // Only the source's bottom-right pixel lands, at dst (0, 0).
    assert_eq!(&dst[0..4], &[9, 9, 9, 9]);
    assert_eq!(&dst[4..8], &[0, 0, 0, 0]);
    assert_eq!(&dst[8..16], &[0u8; 8]);
}
