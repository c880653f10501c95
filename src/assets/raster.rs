//! Word-to-bitmap step of every cycle.
//!
//! A label is drawn as a single SVG `<text>` node in white, horizontally centered on the canvas
//! and hanging from its top edge, then rendered on a transparent surface. The alpha channel of
//! that surface becomes the cycle's [`AlphaMask`].

use crate::assets::fonts::FontLibrary;
use crate::foundation::core::GridSize;
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::particles::mask::AlphaMask;
use crate::render::frame::FrameRGBA;

/// Rasterized label. Pixels are premultiplied RGBA8, row-major.
#[derive(Clone, Debug)]
pub struct RasterHandle {
    size: GridSize,
    frame: FrameRGBA,
}

impl RasterHandle {
    /// Canvas dimensions.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Rendered pixels.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Opacity mask of the label; any non-zero alpha counts as opaque.
    pub fn alpha_mask(&self) -> SwarmResult<AlphaMask> {
        AlphaMask::from_rgba8(self.size, &self.frame.data)
    }
}

/// Renders labels with a fixed font family through `usvg`/`resvg`.
#[derive(Clone, Debug)]
pub struct GlyphRasterizer {
    fonts: FontLibrary,
    family: String,
    weight: u16,
}

impl GlyphRasterizer {
    /// Rasterizer for `family`; unknown families fall back to whatever the library has.
    pub fn new(fonts: FontLibrary, family: impl Into<String>) -> Self {
        Self {
            fonts,
            family: family.into(),
            weight: 600,
        }
    }

    /// Override the font weight (CSS scale, default 600).
    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    /// Font family requested for every label.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Draw `label` at `font_size` px on a transparent `width x height` surface.
    ///
    /// An empty label yields a blank surface without consulting the font database.
    #[tracing::instrument(skip(self), fields(family = %self.family))]
    pub fn rasterize(
        &self,
        label: &str,
        font_size: f64,
        width: u32,
        height: u32,
    ) -> SwarmResult<RasterHandle> {
        let size = GridSize::new(width, height)?;
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(SwarmError::validation("font size must be finite and > 0"));
        }
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            SwarmError::raster(format!("failed to allocate {width}x{height} drawing surface"))
        })?;

        if !label.is_empty() {
            let svg = label_svg(label, &self.family, self.weight, font_size, width, height);
            let tree = usvg::Tree::from_str(&svg, &self.fonts.usvg_options())
                .map_err(|e| SwarmError::raster(format!("label svg: {e}")))?;
            resvg::render(
                &tree,
                resvg::tiny_skia::Transform::identity(),
                &mut pixmap.as_mut(),
            );
        }

        let frame = FrameRGBA::from_premul(width, height, pixmap.take())?;
        tracing::debug!(
            label,
            opaque = frame.data.chunks_exact(4).filter(|p| p[3] != 0).count(),
            "label rasterized"
        );
        Ok(RasterHandle { size, frame })
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn label_svg(
    label: &str,
    family: &str,
    weight: u16,
    font_size: f64,
    width: u32,
    height: u32,
) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<text x="{cx}" y="0" font-family="{family}" font-size="{size}" font-weight="{weight}" "#,
            r#"fill="white" text-anchor="middle" dominant-baseline="hanging" xml:space="preserve">{text}</text>"#,
            "</svg>"
        ),
        w = width,
        h = height,
        cx = f64::from(width) / 2.0,
        family = escape_xml(family),
        size = font_size,
        weight = weight,
        text = escape_xml(label),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
