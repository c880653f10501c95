//! Square texture atlas of icon glyphs.
//!
//! `n x n` cells, each holding one glyph centered in its cell. Particles sample one cell each;
//! the cell is chosen when the pool is built and never changes.

use std::path::Path;

use rand::Rng;

use crate::assets::fonts::FontLibrary;
use crate::assets::raster::escape_xml;
use crate::choreo::weighted::WeightedTable;
use crate::foundation::core::Rect;
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::render::frame::FrameRGBA;

/// Column/row of one atlas cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct AtlasCell {
    /// Column, `0..n`.
    pub col: u32,
    /// Row, `0..n`.
    pub row: u32,
}

/// First code point of the sequential icon range.
pub const DEFAULT_SEQUENTIAL_FIRST: u32 = 0xF122;

/// Icon code points drawn by [`WeightedPicker::icons`], with equal weight.
pub const DEFAULT_ICON_GLYPHS: [u32; 7] = [61570, 61594, 61575, 61796, 61444, 61488, 61755];

/// Chooses the glyph drawn into atlas cell `index` (row-major).
pub trait GlyphPicker {
    /// Glyph for cell `index`.
    fn pick(&mut self, index: u32) -> char;
}

/// Consecutive code points starting at `first`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequentialPicker {
    first: u32,
}

impl SequentialPicker {
    /// Start at `first`.
    pub fn new(first: u32) -> Self {
        Self { first }
    }
}

impl Default for SequentialPicker {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENTIAL_FIRST)
    }
}

impl GlyphPicker for SequentialPicker {
    fn pick(&mut self, index: u32) -> char {
        self.first
            .checked_add(index)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

/// Random glyph per cell from a weighted list.
#[derive(Clone, Debug)]
pub struct WeightedPicker<R> {
    table: WeightedTable<char>,
    rng: R,
}

impl<R: Rng> WeightedPicker<R> {
    /// Picker over `(code point, weight)` entries. Invalid code points are rejected.
    pub fn new(entries: &[(u32, f64)], rng: R) -> SwarmResult<Self> {
        let chars = entries
            .iter()
            .map(|(cp, w)| {
                char::from_u32(*cp)
                    .map(|c| (c, *w))
                    .ok_or_else(|| SwarmError::validation(format!("invalid code point {cp:#x}")))
            })
            .collect::<SwarmResult<Vec<_>>>()?;
        Ok(Self {
            table: WeightedTable::new(chars)?,
            rng,
        })
    }

    /// The seven default icons, equally weighted.
    pub fn icons(rng: R) -> SwarmResult<Self> {
        let entries: Vec<(u32, f64)> = DEFAULT_ICON_GLYPHS.iter().map(|cp| (*cp, 1.0)).collect();
        Self::new(&entries, rng)
    }
}

impl<R: Rng> GlyphPicker for WeightedPicker<R> {
    fn pick(&mut self, _index: u32) -> char {
        *self.table.choose(&mut self.rng)
    }
}

/// Renders atlases with a fixed icon font.
#[derive(Clone, Debug)]
pub struct AtlasBuilder {
    fonts: FontLibrary,
    family: String,
    cell_px: u32,
    glyph_scale: f64,
}

impl AtlasBuilder {
    /// Builder drawing `family` glyphs at 200/256 of a `cell_px` cell.
    pub fn new(fonts: FontLibrary, family: impl Into<String>, cell_px: u32) -> Self {
        Self {
            fonts,
            family: family.into(),
            cell_px,
            glyph_scale: 200.0 / 256.0,
        }
    }

    /// Glyph size as a fraction of the cell side.
    pub fn with_glyph_scale(mut self, glyph_scale: f64) -> Self {
        self.glyph_scale = glyph_scale;
        self
    }

    /// Render `matrix_len^2` cells. Cell `i` sits at column `i % n`, row `i / n`.
    #[tracing::instrument(
        skip(self, picker),
        fields(family = %self.family, cell_px = self.cell_px)
    )]
    pub fn build(&self, matrix_len: u32, picker: &mut dyn GlyphPicker) -> SwarmResult<Atlas> {
        if matrix_len == 0 || self.cell_px == 0 {
            return Err(SwarmError::validation(
                "atlas matrix length and cell size must be > 0",
            ));
        }
        if !self.glyph_scale.is_finite() || self.glyph_scale <= 0.0 {
            return Err(SwarmError::validation("atlas glyph scale must be finite and > 0"));
        }
        let side = matrix_len
            .checked_mul(self.cell_px)
            .filter(|s| *s <= 16_384)
            .ok_or_else(|| SwarmError::validation("atlas side exceeds 16384 px"))?;

        let glyphs: Vec<char> = (0..matrix_len * matrix_len).map(|i| picker.pick(i)).collect();

        let font_size = f64::from(self.cell_px) * self.glyph_scale;
        let half = f64::from(self.cell_px) / 2.0;
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{side}" height="{side}" viewBox="0 0 {side} {side}">"#
        );
        svg.push_str(&format!(
            r#"<g font-family="{}" font-size="{font_size}" fill="white" text-anchor="middle" dominant-baseline="central">"#,
            escape_xml(&self.family)
        ));
        for (i, g) in glyphs.iter().enumerate() {
            let i = i as u32;
            let x = f64::from(self.cell_px * (i % matrix_len)) + half;
            let y = f64::from(self.cell_px * (i / matrix_len)) + half;
            svg.push_str(&format!(
                r#"<text x="{x}" y="{y}">{}</text>"#,
                escape_xml(&g.to_string())
            ));
        }
        svg.push_str("</g></svg>");

        let tree = usvg::Tree::from_str(&svg, &self.fonts.usvg_options())
            .map_err(|e| SwarmError::raster(format!("atlas svg: {e}")))?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(side, side)
            .ok_or_else(|| SwarmError::raster(format!("failed to allocate {side}x{side} atlas")))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        tracing::debug!(matrix_len, side, "atlas built");
        Ok(Atlas {
            matrix_len,
            cell_px: self.cell_px,
            glyphs,
            frame: FrameRGBA::from_premul(side, side, pixmap.take())?,
        })
    }
}

/// Rendered atlas bitmap plus its layout.
#[derive(Clone, Debug)]
pub struct Atlas {
    matrix_len: u32,
    cell_px: u32,
    glyphs: Vec<char>,
    frame: FrameRGBA,
}

impl Atlas {
    #[cfg(test)]
    pub(crate) fn from_frame(matrix_len: u32, cell_px: u32, frame: FrameRGBA) -> Self {
        Self {
            matrix_len,
            cell_px,
            glyphs: vec![' '; (matrix_len * matrix_len) as usize],
            frame,
        }
    }

    /// Cells per side.
    pub fn matrix_len(&self) -> u32 {
        self.matrix_len
    }

    /// Cell side in pixels.
    pub fn cell_px(&self) -> u32 {
        self.cell_px
    }

    /// Glyph drawn into `cell`.
    pub fn glyph(&self, cell: AtlasCell) -> Option<char> {
        if cell.col >= self.matrix_len || cell.row >= self.matrix_len {
            return None;
        }
        self.glyphs
            .get((cell.row * self.matrix_len + cell.col) as usize)
            .copied()
    }

    /// Region of `cell` in unit texture coordinates: its offset plus a `1/n` square.
    pub fn uv_region(&self, cell: AtlasCell) -> Rect {
        let unit = 1.0 / f64::from(self.matrix_len);
        let x0 = f64::from(cell.col) * unit;
        let y0 = f64::from(cell.row) * unit;
        Rect::new(x0, y0, x0 + unit, y0 + unit)
    }

    /// Mean alpha of `cell` in `[0, 1]`; `0` outside the atlas.
    pub fn coverage(&self, cell: AtlasCell) -> f64 {
        if cell.col >= self.matrix_len || cell.row >= self.matrix_len {
            return 0.0;
        }
        let side = self.frame.width as usize;
        let c = self.cell_px as usize;
        let (x0, y0) = (cell.col as usize * c, cell.row as usize * c);
        let mut sum = 0u64;
        for y in y0..y0 + c {
            let row = &self.frame.data[(y * side + x0) * 4..(y * side + x0 + c) * 4];
            sum += row.chunks_exact(4).map(|p| u64::from(p[3])).sum::<u64>();
        }
        sum as f64 / ((c * c) as f64 * 255.0)
    }

    /// Atlas pixels.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Write the atlas as PNG.
    pub fn save_png(&self, path: &Path) -> SwarmResult<()> {
        self.frame.save_png(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/atlas.rs"]
mod tests;
