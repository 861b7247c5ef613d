use std::sync::Arc;

use crate::{
    compare::layout::{CompareLayout, FitMode, ResolvedLayout},
    foundation::core::{ImageRgba, TransformParams},
    foundation::error::{RelensError, RelensResult},
    foundation::math,
    imaging::{codec, transform},
};

/// Externally injected styling for the comparison canvas.
///
/// The core does not own theming; the composition root passes the page
/// background, label color and label font in.
#[derive(Clone, Debug)]
pub struct CompositorConfig {
    /// Page background as straight RGBA8.
    pub background_rgba8: [u8; 4],
    /// Label text color as straight RGBA8.
    pub label_rgba8: [u8; 4],
    /// Cell fit mode; see [`FitMode`] and DESIGN.md for the default choice.
    pub fit_mode: FitMode,
    /// Raw font bytes for label shaping. Labels degrade to an empty strip
    /// when no font is supplied.
    pub label_font: Option<Arc<Vec<u8>>>,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            background_rgba8: [255, 255, 255, 255],
            label_rgba8: [20, 20, 20, 255],
            fit_mode: FitMode::Fit,
            label_font: None,
        }
    }
}

/// One side's transform plus the cell width its offset was captured in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompareSideParams {
    /// Scale, rotation and offset for this side.
    pub transform: TransformParams,
    /// Pixel width of the preview cell the offset is relative to. The
    /// compositor rescales the offset by `export_cell_width / this`.
    pub source_cell_width: f64,
}

impl Default for CompareSideParams {
    fn default() -> Self {
        Self {
            transform: TransformParams::identity(),
            source_cell_width: CompareLayout::default().reference_cell_width,
        }
    }
}

/// Renders two transformed photos into the fixed two-cell export canvas.
pub struct CompareCompositor {
    layout: CompareLayout,
    config: CompositorConfig,
}

impl Default for CompareCompositor {
    fn default() -> Self {
        Self::new(CompareLayout::default(), CompositorConfig::default())
    }
}

impl CompareCompositor {
    /// Build a compositor from explicit layout and styling.
    pub fn new(layout: CompareLayout, config: CompositorConfig) -> Self {
        Self { layout, config }
    }

    /// Layout used for rasterization; exposed so callers can pre-scale
    /// offsets or size previews consistently.
    pub fn layout(&self) -> &CompareLayout {
        &self.layout
    }

    /// Compose the side-by-side comparison image.
    ///
    /// Fails with [`RelensError::Composition`] when both sides are absent; a
    /// single absent side renders as an empty cell. Transform failures from
    /// either side propagate unchanged.
    #[tracing::instrument(skip_all, fields(
        left = left.is_some(),
        right = right.is_some(),
        labeled = left_label.is_some() || right_label.is_some(),
    ))]
    pub fn composite(
        &self,
        left: Option<&ImageRgba>,
        right: Option<&ImageRgba>,
        left_params: &CompareSideParams,
        right_params: &CompareSideParams,
        left_label: Option<&str>,
        right_label: Option<&str>,
    ) -> RelensResult<ImageRgba> {
        if left.is_none() && right.is_none() {
            return Err(RelensError::composition(
                "at least one source image is required",
            ));
        }

        let left_label = left_label.filter(|s| !s.is_empty());
        let right_label = right_label.filter(|s| !s.is_empty());
        let has_labels = left_label.is_some() || right_label.is_some();
        let resolved = self.layout.resolve(has_labels);

        let bg = premul(self.config.background_rgba8);
        let mut canvas =
            vec![0u8; resolved.canvas_width as usize * resolved.canvas_height as usize * 4];
        for px in canvas.chunks_exact_mut(4) {
            px.copy_from_slice(&bg);
        }

        for (img, params, cell_x) in [
            (left, left_params, resolved.left_x),
            (right, right_params, resolved.right_x),
        ] {
            let Some(img) = img else {
                continue;
            };
            let cell = self.render_cell(img, params, &resolved)?;
            over_blit(
                &mut canvas,
                resolved.canvas_width,
                &cell,
                resolved.cell_width,
                resolved.cell_height,
                cell_x,
                0,
            );
        }

        if has_labels {
            self.draw_labels(&mut canvas, &resolved, left_label, right_label)?;
        }

        ImageRgba::from_premul_parts(resolved.canvas_width, resolved.canvas_height, canvas)
    }

    /// Transform one source, fit it into a cell-sized surface and round the
    /// corners. The returned buffer is transparent where the page background
    /// should show through.
    fn render_cell(
        &self,
        img: &ImageRgba,
        params: &CompareSideParams,
        resolved: &ResolvedLayout,
    ) -> RelensResult<Vec<u8>> {
        if !params.source_cell_width.is_finite() || params.source_cell_width <= 0.0 {
            return Err(RelensError::composition(
                "source_cell_width must be finite and > 0",
            ));
        }
        let ratio = f64::from(resolved.cell_width) / params.source_cell_width;
        let side = params.transform.with_offset_scaled(ratio);
        let transformed = transform::transform(img, &side)?;

        let (cw, ch) = (resolved.cell_width, resolved.cell_height);
        let mut cell = vec![0u8; cw as usize * ch as usize * 4];

        let fit_x = f64::from(cw) / f64::from(transformed.width);
        let fit_y = f64::from(ch) / f64::from(transformed.height);
        let fit = match self.config.fit_mode {
            FitMode::Fit => fit_x.min(fit_y),
            FitMode::Fill => fit_x.max(fit_y),
        };
        let fw = ((f64::from(transformed.width) * fit).round() as u32).max(1);
        let fh = ((f64::from(transformed.height) * fit).round() as u32).max(1);
        let fitted = codec::resize_exact(&transformed, fw, fh)?;

        // Centered placement; Fill mode overflows and is cropped by the copy.
        let ox = (i64::from(cw) - i64::from(fw)) / 2;
        let oy = (i64::from(ch) - i64::from(fh)) / 2;
        copy_clipped(&mut cell, cw, ch, &fitted, ox, oy);

        round_corners(&mut cell, cw, ch, resolved.corner_radius);
        Ok(cell)
    }

    fn draw_labels(
        &self,
        canvas: &mut [u8],
        resolved: &ResolvedLayout,
        left_label: Option<&str>,
        right_label: Option<&str>,
    ) -> RelensResult<()> {
        let Some(font) = self.config.label_font.as_ref() else {
            tracing::warn!("labels requested but no label font configured; strip left empty");
            return Ok(());
        };

        let mut engine = LabelEngine::new();
        for (label, cell_x) in [(left_label, resolved.left_x), (right_label, resolved.right_x)] {
            let Some(text) = label else {
                continue;
            };
            let strip = engine.render(
                text,
                font,
                resolved.label_font_size,
                self.config.label_rgba8,
                resolved.cell_width,
                resolved.label_strip_height,
            )?;
            over_blit(
                canvas,
                resolved.canvas_width,
                &strip,
                resolved.cell_width,
                resolved.label_strip_height,
                cell_x,
                resolved.cell_height,
            );
        }
        Ok(())
    }
}

fn premul(straight: [u8; 4]) -> [u8; 4] {
    let a = u16::from(straight[3]);
    [
        math::mul_div255_u8(u16::from(straight[0]), a),
        math::mul_div255_u8(u16::from(straight[1]), a),
        math::mul_div255_u8(u16::from(straight[2]), a),
        straight[3],
    ]
}

/// Blend a premultiplied tile over the canvas at `(ox, oy)`.
fn over_blit(dst: &mut [u8], dst_w: u32, src: &[u8], src_w: u32, src_h: u32, ox: u32, oy: u32) {
    let dst_row = dst_w as usize * 4;
    let src_row = src_w as usize * 4;
    for y in 0..src_h as usize {
        let doff = (oy as usize + y) * dst_row + ox as usize * 4;
        let soff = y * src_row;
        let drow = &mut dst[doff..doff + src_row];
        let srow = &src[soff..soff + src_row];
        for (d, s) in drow.chunks_exact_mut(4).zip(srow.chunks_exact(4)) {
            let out = math::over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
            d.copy_from_slice(&out);
        }
    }
}

/// Copy `src` into a `dst_w x dst_h` surface at a possibly negative origin,
/// clipping whatever falls outside.
fn copy_clipped(dst: &mut [u8], dst_w: u32, dst_h: u32, src: &ImageRgba, ox: i64, oy: i64) {
    let dst_row = dst_w as usize * 4;
    let src_row = src.row_bytes();

    let x0 = (-ox).clamp(0, i64::from(src.width));
    let x1 = (i64::from(dst_w) - ox).clamp(0, i64::from(src.width));
    let copy_w = ((x1 - x0) as usize) * 4;
    if copy_w == 0 {
        return;
    }

    for sy in 0..i64::from(src.height) {
        let ty = sy + oy;
        if ty < 0 || ty >= i64::from(dst_h) {
            continue;
        }
        let soff = sy as usize * src_row + x0 as usize * 4;
        let doff = ty as usize * dst_row + (x0 + ox) as usize * 4;
        dst[doff..doff + copy_w].copy_from_slice(&src.rgba8_premul[soff..soff + copy_w]);
    }
}

/// Multiply corner pixels by an antialiased rounded-rect coverage mask.
fn round_corners(cell: &mut [u8], width: u32, height: u32, radius: f64) {
    if radius <= 0.0 {
        return;
    }
    let radius = radius.min(f64::from(width.min(height)) / 2.0);
    let r_ceil = radius.ceil() as u32;
    let (w, h) = (width as usize, height as usize);

    // Circle centers of the four corner arcs.
    let centers = [
        (radius, radius),
        (f64::from(width) - radius, radius),
        (radius, f64::from(height) - radius),
        (f64::from(width) - radius, f64::from(height) - radius),
    ];
    let x_ranges = [
        0..r_ceil as usize,
        w - r_ceil as usize..w,
        0..r_ceil as usize,
        w - r_ceil as usize..w,
    ];
    let y_ranges = [
        0..r_ceil as usize,
        0..r_ceil as usize,
        h - r_ceil as usize..h,
        h - r_ceil as usize..h,
    ];

    for corner in 0..4 {
        let (cx, cy) = centers[corner];
        for y in y_ranges[corner].clone() {
            for x in x_ranges[corner].clone() {
                let px = x as f64 + 0.5;
                let py = y as f64 + 0.5;
                // Only the region outside the arc center quadrant is masked.
                if (px < cx) == (corner % 2 == 0) && (py < cy) == (corner < 2) {
                    let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
                    let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
                    if coverage < 1.0 {
                        let off = (y * w + x) * 4;
                        for c in 0..4 {
                            cell[off + c] =
                                (f64::from(cell[off + c]) * coverage).round() as u8;
                        }
                    }
                }
            }
        }
    }
}

/// RGBA8 brush color used by Parley label layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LabelBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Stateful helper for shaping and rasterizing label text.
struct LabelEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<LabelBrush>,
}

impl LabelEngine {
    fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Rasterize one centered label into a premultiplied strip buffer.
    fn render(
        &mut self,
        text: &str,
        font_bytes: &Arc<Vec<u8>>,
        font_size: f32,
        color_rgba8: [u8; 4],
        strip_width: u32,
        strip_height: u32,
    ) -> RelensResult<Vec<u8>> {
        let strip_len = strip_width as usize * strip_height as usize * 4;
        if strip_len == 0 {
            return Ok(Vec::new());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font_bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            RelensError::composition("no font families registered from label font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RelensError::composition("registered label font has no family name"))?
            .to_string();

        let brush = LabelBrush {
            r: color_rgba8[0],
            g: color_rgba8[1],
            b: color_rgba8[2],
            a: color_rgba8[3],
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<LabelBrush> = builder.build(text);
        layout.break_all_lines(Some(strip_width as f32));
        layout.align(
            Some(strip_width as f32),
            parley::Alignment::Center,
            parley::AlignmentOptions::default(),
        );

        let w: u16 = strip_width
            .try_into()
            .map_err(|_| RelensError::composition("label strip width exceeds u16"))?;
        let h: u16 = strip_height
            .try_into()
            .map_err(|_| RelensError::composition("label strip height exceeds u16"))?;

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
            0,
        );

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let v_center = (f64::from(strip_height) - f64::from(layout.height())) / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((0.0, v_center.max(0.0))));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap.data_as_u8_slice().to_vec())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compare/compositor.rs"]
mod tests;
