/// How a transformed source is placed into its fixed-aspect cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FitMode {
    /// Aspect-fit centered; the whole transformed result stays visible.
    #[default]
    Fit,
    /// Aspect-fill centered; overflow is cropped to the cell.
    Fill,
}

/// Fixed logical geometry of the two-cell comparison canvas.
///
/// All visual proportions are expressed against a reference on-screen cell
/// width, so corner rounding and label type scale with the cell and the
/// export looks identical to the preview regardless of absolute resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompareLayout {
    /// Logical content width of the image row.
    pub content_width: f64,
    /// Logical gap between the two cells.
    pub cell_gap: f64,
    /// Device-independent scale factor applied when rasterizing.
    pub render_scale: f64,
    /// On-screen cell width the reference constants below were tuned at.
    pub reference_cell_width: f64,
    /// Corner radius at the reference cell width.
    pub reference_corner_radius: f64,
    /// Label font size at the reference cell width.
    pub reference_label_font_size: f64,
    /// Label strip height at the reference cell width.
    pub reference_label_strip_height: f64,
}

/// Cells are portrait 3:4 (width:height).
const CELL_ASPECT_H_OVER_W: f64 = 4.0 / 3.0;

impl Default for CompareLayout {
    fn default() -> Self {
        Self {
            content_width: 1600.0,
            cell_gap: 2.0,
            render_scale: 2.0,
            reference_cell_width: 180.0,
            reference_corner_radius: 14.0,
            reference_label_font_size: 15.0,
            reference_label_strip_height: 36.0,
        }
    }
}

/// Integer pixel geometry for one rasterization of the comparison canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    /// X origin of the left cell (always 0) and the right cell.
    pub left_x: u32,
    pub right_x: u32,
    /// Corner radius in pixels (fractional radii keep the screen ratio).
    pub corner_radius: f64,
    pub label_font_size: f32,
    /// Zero when no label strip is reserved.
    pub label_strip_height: u32,
}

impl CompareLayout {
    /// Export cell width in pixels; the reference width for offset rescaling.
    pub fn cell_width_px(&self) -> f64 {
        (self.content_width - self.cell_gap) / 2.0 * self.render_scale
    }

    /// Ratio between the export cell width and the reference screen cell.
    pub fn width_ratio(&self) -> f64 {
        self.cell_width_px() / self.reference_cell_width
    }

    /// Resolve logical geometry to pixels, reserving the label strip when
    /// any label is present.
    pub fn resolve(&self, has_labels: bool) -> ResolvedLayout {
        let cell_w = self.cell_width_px().round() as u32;
        let cell_h = (f64::from(cell_w) * CELL_ASPECT_H_OVER_W).round() as u32;
        let gap = (self.cell_gap * self.render_scale).round() as u32;

        let ratio = self.width_ratio();
        let strip = if has_labels {
            (self.reference_label_strip_height * ratio).round() as u32
        } else {
            0
        };

        ResolvedLayout {
            canvas_width: cell_w * 2 + gap,
            canvas_height: cell_h + strip,
            cell_width: cell_w,
            cell_height: cell_h,
            left_x: 0,
            right_x: cell_w + gap,
            corner_radius: self.reference_corner_radius * ratio,
            label_font_size: (self.reference_label_font_size * ratio) as f32,
            label_strip_height: strip,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compare/layout.rs"]
mod tests;
