//! Generative particle typography.
//!
//! A rotating list of words materializes out of a swarm of billboarded particles while a virtual
//! camera performs a randomized move and each cycle's playback rate is warped.
//!
//! The pipeline per cycle:
//!
//! 1. [`GlyphRasterizer`] draws the word into an [`AlphaMask`] at the pool's layout size.
//! 2. [`assign`] binds [`ParticlePool`] slots to mask pixels in column-major order.
//! 3. [`plan`] computes one [`MotionPlan`] per binding; [`submit`] turns the plans into
//!    [`Schedule`] instructions.
//! 4. [`CameraDirector`] and [`TimeRemapper`] add a camera move and a rate overlay to the same
//!    [`Timeline`].
//! 5. [`CycleDriver`] plays it against the [`World`] and starts the next word on completion.
//!
//! [`Show`] wraps the loop with a fixed frame clock and the [`PreviewRenderer`]; frames go to any
//! [`FrameSink`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod animation;
mod assets;
mod choreo;
mod config;
mod encode;
mod foundation;
mod particles;
mod render;
mod show;

pub use animation::ease::Ease;
pub use animation::rate::{RateAnchor, RateOverlay, RateSegment};
pub use animation::schedule::{Channel, Cue, Schedule, Stage, TimelineEvent, TimelineId, Value};
pub use animation::timeline::Timeline;
pub use assets::atlas::{
    Atlas, AtlasBuilder, AtlasCell, DEFAULT_ICON_GLYPHS, DEFAULT_SEQUENTIAL_FIRST, GlyphPicker,
    SequentialPicker, WeightedPicker,
};
pub use assets::fonts::FontLibrary;
pub use assets::raster::{GlyphRasterizer, RasterHandle};
pub use choreo::camera::{CameraDirector, CameraPreset, FovMove, default_camera_presets};
pub use choreo::cycle::{CycleDriver, CycleSettings, CycleState, Phase};
pub use choreo::remap::{RemapPreset, TimeRemapper, default_remap_presets};
pub use choreo::stage::{DustParams, LetterSettings, LetterStage, ParticleLetters};
pub use choreo::weighted::WeightedTable;
pub use choreo::world::{Camera, World};
pub use config::{AtlasSettings, FontSettings, OutputSettings, PickerConfig, ShowConfig};
pub use encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path};
pub use encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use foundation::core::{
    Affine, Fps, FrameIndex, GridSize, Hsl, PixelCoord, Point, Rect, SlotId, Vec2, Vec3,
};
pub use foundation::error::{SwarmError, SwarmResult};
pub use foundation::math::{ThroughCurve, wrap_unit};
pub use particles::mapper::{Assignment, Coverage, assign};
pub use particles::mask::AlphaMask;
pub use particles::planner::{
    MotionPlan, PlannerParams, SwarmDrift, plan, submit, sweep_delay, target_point, tint_for,
};
pub use particles::pool::{ParticlePool, ParticleSlot};
pub use render::frame::FrameRGBA;
pub use render::preview::{PreviewOpts, PreviewRenderer};
pub use render::projection::{Projected, ViewProjection};
pub use show::Show;
