use relens::{
    CompareCompositor, CompareSideParams, ImageRgba, TransformParams, Vec2, encode_png,
};

fn checkerboard(width: u32, height: u32, a: [u8; 4], b: [u8; 4]) -> ImageRgba {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let color = if (x / 8 + y / 8) % 2 == 0 { a } else { b };
            pixels.extend_from_slice(&color);
        }
    }
    ImageRgba::from_premul_parts(width, height, pixels).expect("buffer sized to dims")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let left = checkerboard(240, 320, [200, 60, 60, 255], [240, 240, 240, 255]);
    let right = checkerboard(240, 320, [60, 60, 200, 255], [240, 240, 240, 255]);

    let compositor = CompareCompositor::default();
    let left_side = CompareSideParams {
        transform: TransformParams {
            scale: 1.4,
            angle_degrees: 8.0,
            offset: Vec2::new(10.0, -6.0),
        },
        ..CompareSideParams::default()
    };
    let right_side = CompareSideParams::default();

    let export = compositor.composite(
        Some(&left),
        Some(&right),
        &left_side,
        &right_side,
        Some("January"),
        Some("June"),
    )?;

    let png = encode_png(&export)?;
    std::fs::write("compare_export.png", &png)?;
    println!(
        "wrote compare_export.png ({}x{}, {} bytes)",
        export.width,
        export.height,
        png.len()
    );

    Ok(())
}
