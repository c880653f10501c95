use std::sync::Arc;

use rand::Rng;

use crate::animation::schedule::{Channel, Stage, Value};
use crate::assets::atlas::{Atlas, AtlasCell};
use crate::foundation::core::{Hsl, Vec3};
use crate::particles::pool::ParticlePool;

/// Perspective camera that always looks at the world origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Camera {
    /// Eye position.
    pub position: Vec3,
    /// Vertical field of view in degrees.
    pub fov_deg: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5000.0),
            fov_deg: 45.0,
        }
    }
}

/// Everything the scheduler animates and the renderer draws.
#[derive(Clone, Debug)]
pub struct World {
    /// Particle pool; the only particles that ever exist.
    pub pool: ParticlePool,
    /// Per atlas cell brightness in `[0, 1]`, indexed `row * n + col`.
    pub glyph_weights: Vec<f64>,
    /// Atlas cells per side.
    pub atlas_matrix: u32,
    /// Scene camera.
    pub camera: Camera,
    /// Offset of the whole particle group.
    pub swarm_offset: Vec3,
    /// Black cover overlay opacity, `1` = fully black.
    pub cover_opacity: f64,
    /// Backdrop tint of the current cycle.
    pub backdrop: Hsl,
    /// Static background dust, in world units.
    pub dust: Vec<Vec3>,
    /// Particle texture. Without one, particles draw as flat squares scaled by glyph weight.
    pub atlas: Option<Arc<Atlas>>,
}

impl World {
    /// Fresh world around `pool`, fully covered, with uniform glyph weights and no dust.
    pub fn new(pool: ParticlePool, atlas_matrix: u32) -> Self {
        let cells = (atlas_matrix as usize) * (atlas_matrix as usize);
        Self {
            pool,
            glyph_weights: vec![1.0; cells],
            atlas_matrix,
            camera: Camera::default(),
            swarm_offset: Vec3::ZERO,
            cover_opacity: 1.0,
            backdrop: Hsl::new(0.0, 0.0, 0.0),
            dust: Vec::new(),
            atlas: None,
        }
    }

    /// Texture particles with `atlas` and take its per-cell coverage as glyph weights.
    pub fn attach_atlas(&mut self, atlas: Arc<Atlas>) {
        let n = atlas.matrix_len();
        if n != self.atlas_matrix {
            tracing::warn!(atlas = n, world = self.atlas_matrix, "atlas size mismatch");
        }
        let coverage = (0..n)
            .flat_map(|row| (0..n).map(move |col| AtlasCell { col, row }))
            .map(|cell| atlas.coverage(cell))
            .collect();
        self.set_glyph_coverage(coverage);
        self.atlas = Some(atlas);
    }

    /// Scatter `count` dust points uniformly in a cube of side `extent` centered on the origin.
    pub fn scatter_dust<R: Rng + ?Sized>(&mut self, count: usize, extent: f64, rng: &mut R) {
        self.dust = (0..count)
            .map(|_| {
                Vec3::new(
                    extent * (rng.random::<f64>() - 0.5),
                    extent * (rng.random::<f64>() - 0.5),
                    extent * (rng.random::<f64>() - 0.5),
                )
            })
            .collect();
    }

    /// Replace glyph weights with per-cell coverages normalized to the brightest cell.
    ///
    /// An atlas without ink keeps uniform weights.
    pub fn set_glyph_coverage(&mut self, coverage: Vec<f64>) {
        let max = coverage.iter().copied().fold(0.0, f64::max);
        if coverage.len() != self.glyph_weights.len() || max <= 0.0 {
            tracing::debug!(cells = coverage.len(), max, "keeping uniform glyph weights");
            return;
        }
        self.glyph_weights = coverage.into_iter().map(|c| c / max).collect();
    }

    /// Brightness of atlas cell `(col, row)`; `1` outside the atlas.
    pub fn glyph_weight(&self, col: u32, row: u32) -> f64 {
        if col >= self.atlas_matrix || row >= self.atlas_matrix {
            return 1.0;
        }
        self.glyph_weights
            .get((row * self.atlas_matrix + col) as usize)
            .copied()
            .unwrap_or(1.0)
    }
}

impl Stage for World {
    fn read(&self, channel: Channel) -> Option<Value> {
        match channel {
            Channel::ParticlePosition(id) => self.pool.slot(id).map(|s| Value::Vec3(s.position)),
            Channel::ParticleRotationZ(id) => {
                self.pool.slot(id).map(|s| Value::Scalar(s.rotation.z))
            }
            Channel::ParticleVisible(id) => self.pool.slot(id).map(|s| Value::Flag(s.visible)),
            Channel::CameraPosition => Some(Value::Vec3(self.camera.position)),
            Channel::CameraFov => Some(Value::Scalar(self.camera.fov_deg)),
            Channel::SwarmOffset => Some(Value::Vec3(self.swarm_offset)),
            Channel::CoverOpacity => Some(Value::Scalar(self.cover_opacity)),
        }
    }

    fn write(&mut self, channel: Channel, value: Value) {
        match (channel, value) {
            (Channel::ParticlePosition(id), Value::Vec3(v)) => {
                if let Some(s) = self.pool.slot_mut(id) {
                    s.position = v;
                }
            }
            (Channel::ParticleRotationZ(id), Value::Scalar(z)) => {
                if let Some(s) = self.pool.slot_mut(id) {
                    s.rotation.z = z;
                }
            }
            (Channel::ParticleVisible(id), Value::Flag(f)) => {
                if let Some(s) = self.pool.slot_mut(id) {
                    s.visible = f;
                }
            }
            (Channel::CameraPosition, Value::Vec3(v)) => self.camera.position = v,
            (Channel::CameraFov, Value::Scalar(f)) => self.camera.fov_deg = f,
            (Channel::SwarmOffset, Value::Vec3(v)) => self.swarm_offset = v,
            (Channel::CoverOpacity, Value::Scalar(o)) => self.cover_opacity = o.clamp(0.0, 1.0),
            (channel, value) => {
                tracing::trace!(?channel, ?value, "ignoring mistyped write");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/world.rs"]
mod tests;
