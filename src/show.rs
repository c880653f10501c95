//! Fixed-step frame loop around the cycle driver and the preview renderer.

use rand::RngCore;

use crate::assets::fonts::FontLibrary;
use crate::choreo::cycle::CycleDriver;
use crate::choreo::stage::ParticleLetters;
use crate::config::ShowConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::render::frame::FrameRGBA;
use crate::render::preview::PreviewRenderer;

/// A running show: the first cycle is started on construction.
#[derive(Debug)]
pub struct Show {
    driver: CycleDriver<ParticleLetters>,
    renderer: PreviewRenderer,
    fps: Fps,
    clock: f64,
}

impl Show {
    /// Build the world from `config` and start the first cycle.
    #[tracing::instrument(skip_all)]
    pub fn new(
        config: &ShowConfig,
        fonts: FontLibrary,
        rng: Box<dyn RngCore>,
    ) -> SwarmResult<Self> {
        config.validate()?;
        let mut driver = config.build_driver(fonts, rng)?;
        let renderer = PreviewRenderer::new(config.output.preview.clone())?;
        driver.start()?;
        Ok(Self {
            driver,
            renderer,
            fps: config.output.fps,
            clock: 0.0,
        })
    }

    /// Build with the configured fonts and a fresh OS-seeded RNG.
    pub fn from_config(config: &ShowConfig) -> SwarmResult<Self> {
        Self::new(config, config.load_fonts(), Box::new(rand::rng()))
    }

    /// The cycle driver.
    pub fn driver(&self) -> &CycleDriver<ParticleLetters> {
        &self.driver
    }

    /// Wall seconds played so far.
    pub fn time(&self) -> f64 {
        self.clock
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Play `dt` wall seconds.
    pub fn advance(&mut self, dt: f64) -> SwarmResult<()> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(SwarmError::validation("dt must be finite and >= 0"));
        }
        self.driver.tick(dt)?;
        self.clock += dt;
        Ok(())
    }

    /// Play forward in frame-sized steps until `t` wall seconds. Earlier times are a no-op.
    pub fn advance_to(&mut self, t: f64) -> SwarmResult<()> {
        let step = self.fps.frame_duration_secs();
        while self.clock + step <= t + 1e-9 {
            self.advance(step)?;
        }
        let rest = t - self.clock;
        if rest > 1e-9 {
            self.advance(rest)?;
        }
        Ok(())
    }

    /// Draw the current state.
    pub fn render_frame(&mut self) -> SwarmResult<FrameRGBA> {
        self.renderer.render(self.driver.world())
    }

    /// Render `frames` frames into `sink`, advancing one frame duration after each.
    #[tracing::instrument(skip(self, sink))]
    pub fn render_to_sink(&mut self, frames: u64, sink: &mut dyn FrameSink) -> SwarmResult<()> {
        let opts = self.renderer.opts();
        sink.begin(SinkConfig {
            width: opts.width,
            height: opts.height,
            fps: self.fps,
        })?;
        let step = self.fps.frame_duration_secs();
        for i in 0..frames {
            let frame = self.render_frame()?;
            sink.push_frame(FrameIndex(i), &frame)?;
            self.advance(step)?;
            if i % 60 == 0 {
                tracing::debug!(
                    frame = i,
                    t = self.clock,
                    cycle = self.driver.state().cycle_id,
                    "rendering"
                );
            }
        }
        sink.end()?;
        tracing::info!(frames, cycles = self.driver.state().cycle_id, "render finished");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/show.rs"]
mod tests;
