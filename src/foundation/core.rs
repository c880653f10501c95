use crate::foundation::error::{SwarmError, SwarmResult};

pub use glam::DVec3 as Vec3;
pub use kurbo::{Affine, Point, Rect, Vec2};

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SwarmResult<Self> {
        if den == 0 {
            return Err(SwarmError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SwarmError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert seconds to frame count using floor semantics.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

/// Zero-based output frame number.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Column/row dimensions shared by the raster canvas, the alpha mask and the particle pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridSize {
    /// Columns (pixel width).
    pub cols: u32,
    /// Rows (pixel height).
    pub rows: u32,
}

impl GridSize {
    /// Create a validated grid; both sides must be non-zero.
    pub fn new(cols: u32, rows: u32) -> SwarmResult<Self> {
        if cols == 0 || rows == 0 {
            return Err(SwarmError::validation(format!(
                "grid must be non-empty, got {cols}x{rows}"
            )));
        }
        Ok(Self { cols, rows })
    }

    /// Total number of cells.
    pub fn cells(self) -> usize {
        (self.cols as usize) * (self.rows as usize)
    }
}

/// Stable identity of a pooled particle; equal to its flat pool index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SlotId(pub u32);

impl SlotId {
    /// Flat index into the pool.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One pixel of the raster canvas, addressed column-first.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PixelCoord {
    /// Column, grows rightwards.
    pub col: u32,
    /// Row, grows downwards.
    pub row: u32,
}

impl PixelCoord {
    /// Construct a pixel coordinate.
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Straight-alpha color in HSL space. All channels are normalized to `[0, 1]`; hue wraps.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Hsl {
    /// Hue in turns; any finite value is accepted and wrapped.
    pub h: f64,
    /// Saturation.
    pub s: f64,
    /// Lightness.
    pub l: f64,
}

impl Default for Hsl {
    fn default() -> Self {
        Self {
            h: 0.0,
            s: 0.0,
            l: 1.0,
        }
    }
}

impl Hsl {
    /// Construct a color.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Convert to straight `[r, g, b]` in `[0, 1]`.
    pub fn to_rgb(self) -> [f64; 3] {
        let h = self.h.rem_euclid(1.0);
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);

        if s == 0.0 {
            return [l, l, l];
        }

        fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;

        [
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        ]
    }

    /// Convert to straight RGBA8 with the given alpha in `[0, 1]`.
    pub fn to_rgba8(self, alpha: f64) -> [u8; 4] {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        let [r, g, b] = self.to_rgb();
        [to_u8(r), to_u8(g), to_u8(b), to_u8(alpha)]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
