use crate::foundation::core::{GridSize, PixelCoord};
use crate::foundation::error::{SwarmError, SwarmResult};

/// Boolean opacity grid of a rasterized label; `true` marks an opaque (glyph) pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    size: GridSize,
    // column-major, same order as the particle pool
    opaque: Vec<bool>,
}

impl AlphaMask {
    /// Mask where every pixel has the same opacity.
    pub fn filled(size: GridSize, opaque: bool) -> Self {
        Self {
            size,
            opaque: vec![opaque; size.cells()],
        }
    }

    /// Build from row-major RGBA8 bytes; any non-zero alpha counts as opaque.
    pub fn from_rgba8(size: GridSize, rgba: &[u8]) -> SwarmResult<Self> {
        if rgba.len() != size.cells() * 4 {
            return Err(SwarmError::raster(format!(
                "rgba byte length {} does not match {}x{}",
                rgba.len(),
                size.cols,
                size.rows
            )));
        }
        let w = size.cols as usize;
        let mut opaque = Vec::with_capacity(size.cells());
        for col in 0..size.cols as usize {
            for row in 0..size.rows as usize {
                opaque.push(rgba[(col + row * w) * 4 + 3] != 0);
            }
        }
        Ok(Self { size, opaque })
    }

    /// Build from a predicate, mostly for tests and synthetic masks.
    pub fn from_fn(size: GridSize, mut f: impl FnMut(PixelCoord) -> bool) -> Self {
        let mut opaque = Vec::with_capacity(size.cells());
        for col in 0..size.cols {
            for row in 0..size.rows {
                opaque.push(f(PixelCoord::new(col, row)));
            }
        }
        Self { size, opaque }
    }

    /// Grid dimensions.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Opacity of `pixel`; out-of-range pixels read as transparent.
    pub fn is_opaque(&self, pixel: PixelCoord) -> bool {
        if pixel.col >= self.size.cols || pixel.row >= self.size.rows {
            return false;
        }
        self.opaque[pixel.col as usize * self.size.rows as usize + pixel.row as usize]
    }

    /// Number of opaque pixels.
    pub fn opaque_count(&self) -> usize {
        self.opaque.iter().filter(|o| **o).count()
    }

    /// Number of transparent pixels.
    pub fn transparent_count(&self) -> usize {
        self.opaque.len() - self.opaque_count()
    }

    /// Pixels in traversal order (`for col { for row }`) with their opacity.
    pub fn pixels(&self) -> impl Iterator<Item = (PixelCoord, bool)> + '_ {
        let rows = self.size.rows;
        self.opaque.iter().enumerate().map(move |(i, o)| {
            let i = i as u32;
            (PixelCoord::new(i / rows, i % rows), *o)
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/particles/mask.rs"]
mod tests;
