//! Show configuration.
//!
//! Every field has a default, so `{}` is a valid config. Load with [`ShowConfig::from_path`];
//! the loader validates before returning.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::assets::atlas::{
    AtlasBuilder, DEFAULT_ICON_GLYPHS, DEFAULT_SEQUENTIAL_FIRST, GlyphPicker, SequentialPicker,
    WeightedPicker,
};
use crate::assets::fonts::FontLibrary;
use crate::assets::raster::GlyphRasterizer;
use crate::choreo::camera::{CameraDirector, CameraPreset, default_camera_presets};
use crate::choreo::cycle::{CycleDriver, CycleSettings};
use crate::choreo::remap::{RemapPreset, TimeRemapper, default_remap_presets};
use crate::choreo::stage::{LetterSettings, ParticleLetters};
use crate::foundation::core::Fps;
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::render::preview::PreviewOpts;

/// Fonts used for labels, plus extra font directories.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Label font family.
    pub label_family: String,
    /// Label font weight.
    pub label_weight: u16,
    /// Directories searched for font files in addition to the system fonts.
    pub dirs: Vec<PathBuf>,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            label_family: "Source Code Pro".to_string(),
            label_weight: 600,
            dirs: Vec::new(),
        }
    }
}

/// How atlas cells choose their glyph.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PickerConfig {
    /// Consecutive code points starting at `first`.
    Sequential {
        /// First code point.
        first: u32,
    },
    /// Random `(code point, weight)` entries.
    Weighted {
        /// Glyph table.
        glyphs: Vec<(u32, f64)>,
    },
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self::Sequential {
            first: DEFAULT_SEQUENTIAL_FIRST,
        }
    }
}

impl PickerConfig {
    /// The seven stock icons, equally weighted.
    pub fn icons() -> Self {
        Self::Weighted {
            glyphs: DEFAULT_ICON_GLYPHS.iter().map(|cp| (*cp, 1.0)).collect(),
        }
    }

    fn build(&self, rng: &mut dyn RngCore) -> SwarmResult<Box<dyn GlyphPicker>> {
        Ok(match self {
            Self::Sequential { first } => Box::new(SequentialPicker::new(*first)),
            Self::Weighted { glyphs } => Box::new(WeightedPicker::new(
                glyphs,
                StdRng::seed_from_u64(rng.next_u64()),
            )?),
        })
    }
}

/// Particle texture atlas.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AtlasSettings {
    /// Icon font family.
    pub family: String,
    /// Cell side in pixels.
    pub cell_px: u32,
    /// Glyph size as a fraction of the cell side.
    pub glyph_scale: f64,
    /// Glyph selection.
    pub picker: PickerConfig,
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self {
            family: "FontAwesome".to_string(),
            cell_px: 64,
            glyph_scale: 200.0 / 256.0,
            picker: PickerConfig::default(),
        }
    }
}

/// Offline output settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Frame rate.
    pub fps: Fps,
    /// Preview renderer settings, including the frame size.
    pub preview: PreviewOpts,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
            preview: PreviewOpts::default(),
        }
    }
}

/// Complete show description.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    /// Word loop.
    pub cycle: CycleSettings,
    /// Letter layout and flight planning.
    pub letters: LetterSettings,
    /// Label fonts.
    pub fonts: FontSettings,
    /// Particle atlas.
    pub atlas: AtlasSettings,
    /// Camera moves to choose from.
    pub camera_presets: Vec<CameraPreset>,
    /// Time remaps to choose from.
    pub remap_presets: Vec<RemapPreset>,
    /// Frame output.
    pub output: OutputSettings,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            cycle: CycleSettings::default(),
            letters: LetterSettings::default(),
            fonts: FontSettings::default(),
            atlas: AtlasSettings::default(),
            camera_presets: default_camera_presets(),
            remap_presets: default_remap_presets(),
            output: OutputSettings::default(),
        }
    }
}

impl ShowConfig {
    /// Read and validate a JSON config.
    pub fn from_path(path: &Path) -> SwarmResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), words = cfg.cycle.words.len(), "config loaded");
        Ok(cfg)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> SwarmResult<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every section. Preset tables are checked when the directors are built.
    pub fn validate(&self) -> SwarmResult<()> {
        self.cycle.validate()?;
        self.letters.validate()?;
        self.output.preview.validate()?;
        Fps::new(self.output.fps.num, self.output.fps.den)?;
        if self.atlas.cell_px == 0 {
            return Err(SwarmError::validation("atlas cell_px must be > 0"));
        }
        if !self.atlas.glyph_scale.is_finite() || self.atlas.glyph_scale <= 0.0 {
            return Err(SwarmError::validation(
                "atlas glyph_scale must be finite and > 0",
            ));
        }
        if self.fonts.label_family.trim().is_empty() {
            return Err(SwarmError::validation("label font family must not be empty"));
        }
        CameraDirector::new(self.camera_presets.clone())?;
        TimeRemapper::new(self.remap_presets.clone())?;
        Ok(())
    }

    /// Load the configured fonts.
    pub fn load_fonts(&self) -> FontLibrary {
        FontLibrary::load(&self.fonts.dirs)
    }

    /// Build the letter stage over `fonts`.
    pub fn build_stage(
        &self,
        fonts: FontLibrary,
        rng: &mut dyn RngCore,
    ) -> SwarmResult<ParticleLetters> {
        let rasterizer = GlyphRasterizer::new(fonts.clone(), self.fonts.label_family.clone())
            .with_weight(self.fonts.label_weight);
        let atlas = AtlasBuilder::new(fonts, self.atlas.family.clone(), self.atlas.cell_px)
            .with_glyph_scale(self.atlas.glyph_scale);
        let picker = self.atlas.picker.build(rng)?;
        ParticleLetters::new(rasterizer, atlas, picker, self.letters.clone())
    }

    /// Build an idle cycle driver over `fonts`.
    pub fn build_driver(
        &self,
        fonts: FontLibrary,
        mut rng: Box<dyn RngCore>,
    ) -> SwarmResult<CycleDriver<ParticleLetters>> {
        let stage = self.build_stage(fonts, rng.as_mut())?;
        CycleDriver::new(
            stage,
            self.cycle.clone(),
            CameraDirector::new(self.camera_presets.clone())?,
            TimeRemapper::new(self.remap_presets.clone())?,
            rng,
        )
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
