//! Scene-building capability used by the cycle driver.
//!
//! The driver owns time and cycle bookkeeping; everything that decides what the scene looks like
//! lives behind [`LetterStage`]. Demo variants (word glyphs, icon atlases, denser pools) are
//! configurations of [`ParticleLetters`] rather than separate implementations.

use std::sync::Arc;

use rand::RngCore;

use crate::animation::schedule::Schedule;
use crate::assets::atlas::{Atlas, AtlasBuilder, GlyphPicker};
use crate::assets::raster::GlyphRasterizer;
use crate::choreo::world::World;
use crate::foundation::core::GridSize;
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::particles::mapper::{Coverage, assign};
use crate::particles::planner::{MotionPlan, PlannerParams, plan, submit};
use crate::particles::pool::ParticlePool;

/// Static background dust field.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DustParams {
    /// Number of dust points.
    pub count: usize,
    /// Side of the cube the dust is scattered in, world units.
    pub extent: f64,
}

impl Default for DustParams {
    fn default() -> Self {
        Self {
            count: 2000,
            extent: 10_000.0,
        }
    }
}

/// Layout and look of the particle letters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LetterSettings {
    /// Raster canvas, which is also the pool layout.
    pub canvas: GridSize,
    /// Label font size in px.
    pub font_size: f64,
    /// Atlas cells per side.
    pub atlas_matrix: u32,
    /// Which mask pixels receive particles.
    pub coverage: Coverage,
    /// Flight planning constants.
    pub planner: PlannerParams,
    /// Background dust.
    pub dust: DustParams,
}

impl Default for LetterSettings {
    fn default() -> Self {
        Self {
            canvas: GridSize {
                cols: 250,
                rows: 40,
            },
            font_size: 42.0,
            atlas_matrix: 8,
            coverage: Coverage::default(),
            planner: PlannerParams::default(),
            dust: DustParams::default(),
        }
    }
}

impl LetterSettings {
    /// Check sizes and planner constants.
    pub fn validate(&self) -> SwarmResult<()> {
        GridSize::new(self.canvas.cols, self.canvas.rows)?;
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(SwarmError::validation("font_size must be finite and > 0"));
        }
        if self.atlas_matrix == 0 {
            return Err(SwarmError::validation("atlas_matrix must be > 0"));
        }
        if !self.dust.extent.is_finite() || self.dust.extent < 0.0 {
            return Err(SwarmError::validation("dust extent must be finite and >= 0"));
        }
        self.planner.validate()
    }
}

/// What a letter scene must be able to do.
pub trait LetterStage {
    /// Build the particle pool (and whatever texture it samples).
    fn create_particles(&mut self, rng: &mut dyn RngCore) -> SwarmResult<ParticlePool>;

    /// Build the static scene around a fresh pool.
    fn create_world(&mut self, rng: &mut dyn RngCore) -> SwarmResult<World>;

    /// Rasterize `label`, bind particles to it and schedule their flights relative to the
    /// schedule's zero. Returns the submitted plans in assignment order.
    fn create_letter(
        &mut self,
        label: &str,
        global_hue: f64,
        world: &mut World,
        schedule: &mut dyn Schedule,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<Vec<MotionPlan>>;
}

/// Particle typography: a word rasterized into a mask, filled by atlas-textured particles.
pub struct ParticleLetters {
    rasterizer: GlyphRasterizer,
    atlas_builder: AtlasBuilder,
    picker: Box<dyn GlyphPicker>,
    settings: LetterSettings,
    atlas: Option<Arc<Atlas>>,
}

impl std::fmt::Debug for ParticleLetters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleLetters")
            .field("rasterizer", &self.rasterizer)
            .field("settings", &self.settings)
            .field("atlas_built", &self.atlas.is_some())
            .finish_non_exhaustive()
    }
}

impl ParticleLetters {
    /// Assemble a stage from its collaborators.
    pub fn new(
        rasterizer: GlyphRasterizer,
        atlas_builder: AtlasBuilder,
        picker: Box<dyn GlyphPicker>,
        settings: LetterSettings,
    ) -> SwarmResult<Self> {
        settings.validate()?;
        Ok(Self {
            rasterizer,
            atlas_builder,
            picker,
            settings,
            atlas: None,
        })
    }

    /// Settings in use.
    pub fn settings(&self) -> &LetterSettings {
        &self.settings
    }

    /// Atlas built by [`LetterStage::create_particles`], if it ran.
    pub fn atlas(&self) -> Option<&Atlas> {
        self.atlas.as_deref()
    }
}

impl LetterStage for ParticleLetters {
    fn create_particles(&mut self, rng: &mut dyn RngCore) -> SwarmResult<ParticlePool> {
        let n = self.settings.atlas_matrix;
        let atlas = self.atlas_builder.build(n, self.picker.as_mut())?;
        self.atlas = Some(Arc::new(atlas));
        ParticlePool::build(self.settings.canvas, n, rng)
    }

    #[tracing::instrument(skip_all)]
    fn create_world(&mut self, rng: &mut dyn RngCore) -> SwarmResult<World> {
        let pool = self.create_particles(rng)?;
        let n = self.settings.atlas_matrix;
        let mut world = World::new(pool, n);
        if let Some(atlas) = &self.atlas {
            world.attach_atlas(Arc::clone(atlas));
        }
        world.scatter_dust(self.settings.dust.count, self.settings.dust.extent, rng);
        tracing::info!(
            particles = world.pool.len(),
            dust = world.dust.len(),
            "world created"
        );
        Ok(world)
    }

    #[tracing::instrument(skip(self, world, schedule, rng))]
    fn create_letter(
        &mut self,
        label: &str,
        global_hue: f64,
        world: &mut World,
        schedule: &mut dyn Schedule,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<Vec<MotionPlan>> {
        let canvas = world.pool.layout();
        let raster = self.rasterizer.rasterize(
            label,
            self.settings.font_size,
            canvas.cols,
            canvas.rows,
        )?;
        let mask = raster.alpha_mask()?;

        let assignments = assign(&mask, &world.pool, self.settings.coverage);
        let plans = plan(&assignments, canvas, global_hue, &self.settings.planner, rng);
        let submitted = submit(&plans, &self.settings.planner, &mut world.pool, schedule);

        tracing::debug!(
            eligible = self.settings.coverage.eligible(&mask),
            submitted,
            "letter staged"
        );
        Ok(plans)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/stage.rs"]
mod tests;
