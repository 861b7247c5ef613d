use rayon::prelude::*;

use crate::{
    foundation::core::{ImageRgba, TransformParams},
    foundation::error::{RelensError, RelensResult},
    imaging::codec,
};

/// Apply scale, then rotation, then translation to a premultiplied buffer.
///
/// The three stages are strictly ordered and each allocates its own output
/// canvas:
///
/// 1. **Scale** resamples to `scale x original` dimensions (Catmull-Rom).
/// 2. **Rotation** (when the angle is not a multiple of 360 degrees) allocates
///    the axis-aligned bounding box of the rotated rectangle and draws the
///    scaled image rotated about the canvas center.
/// 3. **Translation** shifts content inside a same-size canvas; pixels pushed
///    past an edge are clipped, the canvas never grows.
///
/// The input is never mutated. Behavior depends only on the parameter values,
/// not on absolute pixel counts, so the same params reproduce the same
/// framing at preview and export resolution once the caller rescales the
/// offset by the cell-width ratio.
pub fn transform(src: &ImageRgba, params: &TransformParams) -> RelensResult<ImageRgba> {
    if !params.scale.is_finite() || params.scale <= 0.0 {
        return Err(RelensError::invalid_transform(format!(
            "scale must be finite and > 0, got {}",
            params.scale
        )));
    }

    let scaled = scale_stage(src, params.scale)?;

    let angle = params.angle_degrees.rem_euclid(360.0);
    let rotated = if angle == 0.0 {
        scaled
    } else {
        rotate_stage(&scaled, angle.to_radians())
    };

    // A shift of one full canvas dimension already clears every pixel, so
    // larger offsets clamp to it before the integer conversion.
    let max_dx = f64::from(rotated.width);
    let max_dy = f64::from(rotated.height);
    let dx = params.offset.x.round().clamp(-max_dx, max_dx) as i64;
    let dy = params.offset.y.round().clamp(-max_dy, max_dy) as i64;
    if dx == 0 && dy == 0 {
        Ok(rotated)
    } else {
        Ok(translate_stage(&rotated, dx, dy))
    }
}

fn scale_stage(src: &ImageRgba, scale: f64) -> RelensResult<ImageRgba> {
    let nw = ((f64::from(src.width) * scale).round() as u32).max(1);
    let nh = ((f64::from(src.height) * scale).round() as u32).max(1);
    codec::resize_exact(src, nw, nh)
}

/// Bounding box of a `w x h` rectangle rotated by `rad`, rounded to pixels.
pub(crate) fn rotated_bounds(width: u32, height: u32, rad: f64) -> (u32, u32) {
    let (w, h) = (f64::from(width), f64::from(height));
    let (cos_a, sin_a) = (rad.cos().abs(), rad.sin().abs());
    let out_w = (w * cos_a + h * sin_a).round().max(1.0) as u32;
    let out_h = (w * sin_a + h * cos_a).round().max(1.0) as u32;
    (out_w, out_h)
}

fn rotate_stage(src: &ImageRgba, rad: f64) -> ImageRgba {
    let (out_w, out_h) = rotated_bounds(src.width, src.height, rad);
    let (sin_a, cos_a) = rad.sin_cos();

    let src_cx = f64::from(src.width) / 2.0;
    let src_cy = f64::from(src.height) / 2.0;
    let dst_cx = f64::from(out_w) / 2.0;
    let dst_cy = f64::from(out_h) / 2.0;

    let src_px = src.rgba8_premul.as_ref().as_slice();
    let row_bytes = out_w as usize * 4;
    let mut out = vec![0u8; out_h as usize * row_bytes];

    out.par_chunks_mut(row_bytes).enumerate().for_each(|(y, row)| {
        let dy = (y as f64 + 0.5) - dst_cy;
        for x in 0..out_w as usize {
            let dx = (x as f64 + 0.5) - dst_cx;
            // Inverse-map the destination pixel center back into source space.
            let sx = cos_a * dx + sin_a * dy + src_cx;
            let sy = -sin_a * dx + cos_a * dy + src_cy;
            let px = sample_bilinear(src_px, src.width, src.height, sx - 0.5, sy - 0.5);
            row[x * 4..x * 4 + 4].copy_from_slice(&px);
        }
    });

    ImageRgba {
        width: out_w,
        height: out_h,
        rgba8_premul: std::sync::Arc::new(out),
    }
}

fn translate_stage(src: &ImageRgba, dx: i64, dy: i64) -> ImageRgba {
    let (w, h) = (src.width as i64, src.height as i64);
    let row_bytes = src.row_bytes();
    let mut out = vec![0u8; src.rgba8_premul.len()];

    let src_x0 = (-dx).clamp(0, w);
    let src_x1 = (w - dx).clamp(0, w);
    let copy_w = ((src_x1 - src_x0) as usize) * 4;

    if copy_w > 0 {
        for sy in 0..h {
            let ty = sy + dy;
            if ty < 0 || ty >= h {
                continue;
            }
            let src_off = sy as usize * row_bytes + src_x0 as usize * 4;
            let dst_off = ty as usize * row_bytes + (src_x0 + dx) as usize * 4;
            out[dst_off..dst_off + copy_w]
                .copy_from_slice(&src.rgba8_premul[src_off..src_off + copy_w]);
        }
    }

    ImageRgba {
        width: src.width,
        height: src.height,
        rgba8_premul: std::sync::Arc::new(out),
    }
}

/// Bilinear sample of a premultiplied buffer; fully outside reads are
/// transparent.
fn sample_bilinear(px: &[u8], width: u32, height: u32, x: f64, y: f64) -> [u8; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let fetch = |xi: i64, yi: i64| -> [f64; 4] {
        if xi < 0 || yi < 0 || xi >= i64::from(width) || yi >= i64::from(height) {
            return [0.0; 4];
        }
        let off = (yi as usize * width as usize + xi as usize) * 4;
        [
            f64::from(px[off]),
            f64::from(px[off + 1]),
            f64::from(px[off + 2]),
            f64::from(px[off + 3]),
        ]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] * (1.0 - fx) + p10[c] * fx;
        let bot = p01[c] * (1.0 - fx) + p11[c] * fx;
        out[c] = (top * (1.0 - fy) + bot * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/transform.rs"]
mod tests;
