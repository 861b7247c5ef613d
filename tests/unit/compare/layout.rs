use super::*;

#[test]
fn default_export_geometry() {
    let layout = CompareLayout::default();
    assert_eq!(layout.cell_width_px(), 1598.0);

    let resolved = layout.resolve(false);
    assert_eq!(resolved.cell_width, 1598);
    assert_eq!(resolved.cell_height, 2131); // 1598 * 4/3 rounded
    assert_eq!(resolved.canvas_width, 3200);
    assert_eq!(resolved.canvas_height, 2131);
    assert_eq!(resolved.left_x, 0);
    assert_eq!(resolved.right_x, 1602); // cell + 2*2 gap
    assert_eq!(resolved.label_strip_height, 0);
}

#[test]
fn label_strip_extends_canvas_only_when_present() {
    let layout = CompareLayout::default();
    let without = layout.resolve(false);
    let with = layout.resolve(true);
    assert!(with.label_strip_height > 0);
    assert_eq!(
        with.canvas_height,
        without.canvas_height + with.label_strip_height
    );
    assert_eq!(with.canvas_width, without.canvas_width);
}

#[test]
fn corner_radius_keeps_reference_ratio() {
    let layout = CompareLayout::default();
    let resolved = layout.resolve(false);
    let reference_ratio = layout.reference_corner_radius / layout.reference_cell_width;
    let export_ratio = resolved.corner_radius / f64::from(resolved.cell_width);
    assert!((reference_ratio - export_ratio).abs() < 1e-9);
}

#[test]
fn label_font_scales_with_cell_width() {
    let layout = CompareLayout::default();
    let resolved = layout.resolve(true);
    let expected = layout.reference_label_font_size * layout.width_ratio();
    assert!((f64::from(resolved.label_font_size) - expected).abs() < 1e-3);
}

#[test]
fn cells_are_portrait_three_by_four() {
    let layout = CompareLayout::default();
    let resolved = layout.resolve(false);
    let aspect = f64::from(resolved.cell_height) / f64::from(resolved.cell_width);
    assert!((aspect - 4.0 / 3.0).abs() < 1e-3);
}

#[test]
fn resolve_is_reproducible() {
    let layout = CompareLayout::default();
    assert_eq!(layout.resolve(true), layout.resolve(true));
    assert_ne!(layout.resolve(true), layout.resolve(false));
}

#[test]
fn fit_mode_defaults_to_fit() {
    assert_eq!(FitMode::default(), FitMode::Fit);
}
