use std::io::Cursor;

use anyhow::Context;
use image::{DynamicImage, ImageDecoder, ImageEncoder, imageops::FilterType};

use crate::foundation::{
    core::ImageRgba,
    error::{RelensError, RelensResult},
};

/// Decode encoded image bytes into an upright premultiplied RGBA8 buffer.
///
/// Orientation metadata is applied here and then discarded, so downstream
/// transform math never special-cases the eight EXIF variants.
pub fn decode_image(bytes: &[u8]) -> RelensResult<ImageRgba> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("guess image format")?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| RelensError::decode(format!("unreadable image bytes: {e}")))?;
    let orientation = decoder
        .orientation()
        .unwrap_or(image::metadata::Orientation::NoTransforms);

    let mut dyn_img = DynamicImage::from_decoder(decoder)
        .map_err(|e| RelensError::decode(format!("decode image: {e}")))?;
    dyn_img.apply_orientation(orientation);

    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    ImageRgba::from_premul_parts(width, height, rgba8_premul)
}

/// Encode to JPEG at the given quality, flattening alpha over opaque white.
pub fn encode_jpeg(img: &ImageRgba, quality: u8) -> RelensResult<Vec<u8>> {
    let rgb = flatten_over_white(img);
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut Cursor::new(&mut out), quality)
        .write_image(
            &rgb,
            img.width,
            img.height,
            image::ExtendedColorType::Rgb8,
        )
        .context("encode jpeg")?;
    Ok(out)
}

/// Encode to PNG, preserving alpha as straight (unpremultiplied) RGBA.
pub fn encode_png(img: &ImageRgba) -> RelensResult<Vec<u8>> {
    let straight = unpremultiply(img);
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut Cursor::new(&mut out))
        .write_image(
            &straight,
            img.width,
            img.height,
            image::ExtendedColorType::Rgba8,
        )
        .context("encode png")?;
    Ok(out)
}

/// Resample to exactly `width x height` with Catmull-Rom interpolation.
///
/// Interpolation happens in the premultiplied domain, which keeps edges of
/// transparent regions from bleeding color.
pub fn resize_exact(img: &ImageRgba, width: u32, height: u32) -> RelensResult<ImageRgba> {
    if width == 0 || height == 0 {
        return Err(RelensError::decode("resize target must be non-zero"));
    }
    if width == img.width && height == img.height {
        return Ok(img.clone());
    }

    let src = image::RgbaImage::from_raw(img.width, img.height, img.rgba8_premul.as_ref().clone())
        .ok_or_else(|| RelensError::decode("image buffer length mismatch"))?;
    let resized = image::imageops::resize(&src, width, height, FilterType::CatmullRom);
    ImageRgba::from_premul_parts(width, height, resized.into_raw())
}

/// Shrink so the longest side fits `max_dim`, preserving aspect. Never grows.
pub fn fit_within(img: &ImageRgba, max_dim: u32) -> RelensResult<ImageRgba> {
    let (w, h) = (img.width, img.height);
    let longest = w.max(h);
    if max_dim == 0 || longest <= max_dim {
        return Ok(img.clone());
    }
    let ratio = f64::from(max_dim) / f64::from(longest);
    let nw = ((f64::from(w) * ratio).round() as u32).max(1);
    let nh = ((f64::from(h) * ratio).round() as u32).max(1);
    resize_exact(img, nw, nh)
}

fn flatten_over_white(img: &ImageRgba) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(img.width as usize * img.height as usize * 3);
    for px in img.rgba8_premul.chunks_exact(4) {
        // Premul over an opaque white background: c + (255 - a).
        let inv = 255 - px[3];
        rgb.push(px[0].saturating_add(inv));
        rgb.push(px[1].saturating_add(inv));
        rgb.push(px[2].saturating_add(inv));
    }
    rgb
}

fn unpremultiply(img: &ImageRgba) -> Vec<u8> {
    let mut out = img.rgba8_premul.as_ref().clone();
    for px in out.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    out
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/codec.rs"]
mod tests;
