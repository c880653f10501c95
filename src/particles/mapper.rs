use crate::foundation::core::{PixelCoord, SlotId};
use crate::particles::mask::AlphaMask;
use crate::particles::pool::ParticlePool;

/// Which mask pixels receive a particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// Transparent pixels get particles; the glyph reads as a hole in the swarm.
    #[default]
    Transparent,
    /// Opaque pixels get particles; the swarm draws the glyph itself.
    Opaque,
}

impl Coverage {
    fn accepts(self, opaque: bool) -> bool {
        match self {
            Coverage::Transparent => !opaque,
            Coverage::Opaque => opaque,
        }
    }

    /// Number of pixels of `mask` this coverage would fill, ignoring the pool budget.
    pub fn eligible(self, mask: &AlphaMask) -> usize {
        match self {
            Coverage::Transparent => mask.transparent_count(),
            Coverage::Opaque => mask.opaque_count(),
        }
    }
}

/// One pixel bound to one pool slot for the current cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Assignment {
    /// Source pixel.
    pub pixel: PixelCoord,
    /// Bound slot.
    pub slot: SlotId,
}

/// Bind pool slots to mask pixels in traversal order.
///
/// Pixels are visited `for col { for row }`; every accepted pixel takes the next slot in pool
/// order. When the pool runs out the remaining pixels are dropped silently. The result is a pure
/// function of the mask, the coverage and the pool size.
pub fn assign(mask: &AlphaMask, pool: &ParticlePool, coverage: Coverage) -> Vec<Assignment> {
    let budget = pool.len();
    let mut out = Vec::with_capacity(coverage.eligible(mask).min(budget));
    for (pixel, opaque) in mask.pixels() {
        if !coverage.accepts(opaque) {
            continue;
        }
        if out.len() == budget {
            tracing::debug!(budget, "particle budget exhausted, truncating glyph");
            break;
        }
        out.push(Assignment {
            pixel,
            slot: SlotId(out.len() as u32),
        });
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/particles/mapper.rs"]
mod tests;
