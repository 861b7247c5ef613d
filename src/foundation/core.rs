use std::sync::Arc;

use crate::foundation::error::{RelensError, RelensResult};

pub use kurbo::Vec2;

/// Decoded raster image in premultiplied RGBA8 form.
///
/// This is the universal pixel currency of the crate: decode normalizes every
/// source to an upright premultiplied buffer, and all transform/composite
/// stages consume and produce this type without touching external IO.
#[derive(Clone, Debug)]
pub struct ImageRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl ImageRgba {
    /// Wrap raw premultiplied RGBA8 bytes, validating the buffer length.
    pub fn from_premul_parts(width: u32, height: u32, rgba8_premul: Vec<u8>) -> RelensResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| RelensError::decode("image byte size overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(RelensError::decode(format!(
                "image byte length {} does not match {width}x{height}*4",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Byte length of one pixel row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * 4
    }
}

/// Per-side view transform applied to a photo before compositing.
///
/// Transient state only; never persisted. `offset` lives in the coordinate
/// space of the cell the gesture happened in, so callers rescale it when
/// moving between screen and export cell widths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformParams {
    /// Uniform scale factor, must be > 0.
    pub scale: f64,
    /// Rotation in degrees; unbounded, normalized mod 360 only for the math.
    pub angle_degrees: f64,
    /// Translation in the side's local coordinate space.
    pub offset: Vec2,
}

impl TransformParams {
    /// Smallest zoom the interactive gesture layer hands out.
    pub const MIN_SCALE: f64 = 0.5;
    /// Largest zoom the interactive gesture layer hands out.
    pub const MAX_SCALE: f64 = 8.0;

    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            angle_degrees: 0.0,
            offset: Vec2::ZERO,
        }
    }

    /// Clamp `scale` into the interactive range, leaving angle/offset as-is.
    pub fn clamped(self) -> Self {
        Self {
            scale: self.scale.clamp(Self::MIN_SCALE, Self::MAX_SCALE),
            ..self
        }
    }

    /// Return a copy with `offset` rescaled by `ratio`.
    ///
    /// Used when replaying a transform captured against one cell width inside
    /// a cell of a different pixel width.
    pub fn with_offset_scaled(self, ratio: f64) -> Self {
        Self {
            offset: self.offset * ratio,
            ..self
        }
    }
}

impl Default for TransformParams {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
