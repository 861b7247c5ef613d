use std::io::Cursor;

use super::*;

fn png_bytes(width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(width, height, pixels.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_premultiplies_alpha() {
    // One half-transparent red pixel.
    let bytes = png_bytes(1, 1, &[255, 0, 0, 128]);
    let img = decode_image(&bytes).unwrap();
    assert_eq!((img.width, img.height), (1, 1));
    let px = &img.rgba8_premul[0..4];
    assert_eq!(px[3], 128);
    // 255 * 128 / 255 rounded.
    assert_eq!(px[0], 128);
    assert_eq!(px[1], 0);
    assert_eq!(px[2], 0);
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn jpeg_roundtrip_preserves_dimensions() {
    let img = ImageRgba::from_premul_parts(5, 3, vec![200u8; 5 * 3 * 4]).unwrap();
    let jpeg = encode_jpeg(&img, 80).unwrap();
    let back = decode_image(&jpeg).unwrap();
    assert_eq!((back.width, back.height), (5, 3));
}

#[test]
fn png_roundtrip_is_lossless_for_opaque_pixels() {
    let mut pixels = Vec::new();
    for v in 0..16u8 {
        pixels.extend_from_slice(&[v * 16, 255 - v * 16, v, 255]);
    }
    let img = ImageRgba::from_premul_parts(4, 4, pixels.clone()).unwrap();
    let png = encode_png(&img).unwrap();
    let back = decode_image(&png).unwrap();
    assert_eq!(back.rgba8_premul.as_ref(), &pixels);
}

#[test]
fn resize_exact_same_dims_is_identity() {
    let pixels: Vec<u8> = (0..16).map(|v| v * 3).collect();
    let img = ImageRgba::from_premul_parts(2, 2, pixels.clone()).unwrap();
    let same = resize_exact(&img, 2, 2).unwrap();
    assert_eq!(same.rgba8_premul.as_ref(), &pixels);
}

#[test]
fn fit_within_shrinks_longest_side_only() {
    let img = ImageRgba::from_premul_parts(8, 4, vec![255u8; 8 * 4 * 4]).unwrap();
    let fitted = fit_within(&img, 4).unwrap();
    assert_eq!((fitted.width, fitted.height), (4, 2));

    let untouched = fit_within(&img, 16).unwrap();
    assert_eq!((untouched.width, untouched.height), (8, 4));
}
