use rand::Rng;

use crate::assets::atlas::AtlasCell;
use crate::foundation::core::{GridSize, Hsl, PixelCoord, SlotId, Vec2, Vec3};
use crate::foundation::error::{SwarmError, SwarmResult};

/// One reusable billboard. Only transform, visibility and tint change between cycles.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSlot {
    /// Stable identity, equal to the flat pool index.
    pub id: SlotId,
    /// Atlas cell drawn by this particle; fixed for the slot's lifetime.
    pub atlas_cell: AtlasCell,
    /// Top-left of the atlas cell in the unit square.
    pub atlas_offset: Vec2,
    /// Whether the renderer should draw this slot.
    pub visible: bool,
    /// Swarm-local position in world units.
    pub position: Vec3,
    /// Euler rotation in radians; only `z` is animated.
    pub rotation: Vec3,
    /// Material tint.
    pub tint: Hsl,
}

/// Fixed-size set of particles laid out as `cols x rows` with `idx = col * rows + row`.
///
/// The column-major layout is what gives the mapper its left-to-right, top-to-bottom sweep.
#[derive(Clone, Debug)]
pub struct ParticlePool {
    layout: GridSize,
    slots: Vec<ParticleSlot>,
}

impl ParticlePool {
    /// Build `cols * rows` invisible slots, each bound to a random cell of an `atlas_matrix`
    /// square atlas.
    pub fn build<R: Rng + ?Sized>(
        layout: GridSize,
        atlas_matrix: u32,
        rng: &mut R,
    ) -> SwarmResult<Self> {
        if layout.cols == 0 || layout.rows == 0 {
            return Err(SwarmError::validation("particle pool layout must be non-empty"));
        }
        if atlas_matrix == 0 {
            return Err(SwarmError::validation("atlas matrix length must be > 0"));
        }

        let unit = 1.0 / f64::from(atlas_matrix);
        let mut slots = Vec::with_capacity(layout.cells());
        for col in 0..layout.cols {
            for row in 0..layout.rows {
                let cell = AtlasCell {
                    col: rng.random_range(0..atlas_matrix),
                    row: rng.random_range(0..atlas_matrix),
                };
                let id = SlotId(col * layout.rows + row);
                debug_assert_eq!(id.index(), slots.len());
                slots.push(ParticleSlot {
                    id,
                    atlas_cell: cell,
                    atlas_offset: Vec2::new(f64::from(cell.col) * unit, f64::from(cell.row) * unit),
                    visible: false,
                    position: Vec3::ZERO,
                    rotation: Vec3::ZERO,
                    tint: Hsl::default(),
                });
            }
        }

        tracing::debug!(
            cols = layout.cols,
            rows = layout.rows,
            atlas_matrix,
            "particle pool built"
        );
        Ok(Self { layout, slots })
    }

    /// Grid dimensions the pool was built with.
    pub fn layout(&self) -> GridSize {
        self.layout
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false` for a successfully built pool.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot id of the grid cell `pixel`, if inside the layout.
    pub fn slot_at(&self, pixel: PixelCoord) -> Option<SlotId> {
        (pixel.col < self.layout.cols && pixel.row < self.layout.rows)
            .then(|| SlotId(pixel.col * self.layout.rows + pixel.row))
    }

    /// Borrow a slot.
    pub fn slot(&self, id: SlotId) -> Option<&ParticleSlot> {
        self.slots.get(id.index())
    }

    /// Mutably borrow a slot.
    pub fn slot_mut(&mut self, id: SlotId) -> Option<&mut ParticleSlot> {
        self.slots.get_mut(id.index())
    }

    /// All slots in pool order.
    pub fn iter(&self) -> impl Iterator<Item = &ParticleSlot> {
        self.slots.iter()
    }

    /// Hide every slot. Run at the start of every cycle.
    pub fn reset_all(&mut self) {
        for s in &mut self.slots {
            s.visible = false;
        }
    }

    /// Count of slots currently visible.
    pub fn visible_count(&self) -> usize {
        self.slots.iter().filter(|s| s.visible).count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/particles/pool.rs"]
mod tests;
