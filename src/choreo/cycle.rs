//! The endless word loop.
//!
//! ```text
//! Idle -> Rasterizing -> Assigning -> Animating -> Completing -> Rasterizing -> ...
//! ```
//!
//! Every cycle gets a fresh [`Timeline`] with a new [`TimelineId`]. Completion arrives as a
//! [`TimelineEvent`] from playback; events whose id is not the live timeline's are stale and
//! dropped, so nothing scheduled by an earlier cycle can touch the pool again.

use rand::RngCore;

use crate::animation::ease::Ease;
use crate::animation::schedule::{Channel, Cue, Schedule, TimelineEvent, TimelineId, Value};
use crate::animation::timeline::Timeline;
use crate::choreo::camera::CameraDirector;
use crate::choreo::remap::TimeRemapper;
use crate::choreo::stage::LetterStage;
use crate::choreo::world::World;
use crate::foundation::core::Hsl;
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::foundation::math::wrap_unit;
use crate::particles::planner::MotionPlan;

/// Where the driver is in its loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No cycle has started, or the driver was cancelled.
    #[default]
    Idle,
    /// Drawing the current word.
    Rasterizing,
    /// Binding particles and composing the cycle timeline.
    Assigning,
    /// Cycle timeline playing.
    Animating,
    /// Cover fading back in; the next cycle starts when it finishes.
    Completing,
}

/// Snapshot of the live cycle.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct CycleState {
    /// Increments on every started cycle; `0` before the first.
    pub cycle_id: u64,
    /// Index of the word shown by this cycle.
    pub word_index: usize,
    /// The word itself.
    pub word: String,
    /// Particles bound to this cycle's mask.
    pub active_particles: usize,
    /// Camera preset in use.
    pub camera: Option<String>,
    /// Time remap preset in use.
    pub remap: Option<String>,
    /// Hue the next cycle will use.
    pub global_hue: f64,
    /// Loop phase.
    pub phase: Phase,
}

/// Loop tunables.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CycleSettings {
    /// Words shown in order, wrapping around.
    pub words: Vec<String>,
    /// Hue of the first cycle, in turns.
    pub initial_hue: f64,
    /// Hue advance per cycle; the result wraps into `[0, 1)`.
    pub hue_step: f64,
    /// Cover fade duration at both cycle ends, seconds.
    pub fade_secs: f64,
    /// Backdrop saturation.
    pub backdrop_saturation: f64,
    /// Backdrop lightness.
    pub backdrop_lightness: f64,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            words: vec!["WebGL".to_string(), "HTML5".to_string(), "THREE".to_string()],
            initial_hue: 0.6,
            hue_step: 0.2,
            fade_secs: 1.0,
            backdrop_saturation: 1.0,
            backdrop_lightness: 0.5,
        }
    }
}

impl CycleSettings {
    /// Reject an empty word list and non-finite timing.
    pub fn validate(&self) -> SwarmResult<()> {
        if self.words.is_empty() {
            return Err(SwarmError::validation("word list must not be empty"));
        }
        if !self.fade_secs.is_finite() || self.fade_secs < 0.0 {
            return Err(SwarmError::validation("fade_secs must be finite and >= 0"));
        }
        if !self.initial_hue.is_finite() || !self.hue_step.is_finite() {
            return Err(SwarmError::validation("hue settings must be finite"));
        }
        Ok(())
    }
}

/// Runs the word loop against a [`LetterStage`].
pub struct CycleDriver<S> {
    stage: S,
    world: World,
    settings: CycleSettings,
    camera: CameraDirector,
    remap: TimeRemapper,
    rng: Box<dyn RngCore>,
    state: CycleState,
    next_word: usize,
    next_timeline: u64,
    live: Option<Timeline>,
    fade: Option<Timeline>,
    fade_done: bool,
    plans: Vec<MotionPlan>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for CycleDriver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleDriver")
            .field("stage", &self.stage)
            .field("state", &self.state)
            .field("live", &self.live.as_ref().map(Timeline::id))
            .field("fade", &self.fade.as_ref().map(Timeline::id))
            .finish_non_exhaustive()
    }
}

impl<S: LetterStage> CycleDriver<S> {
    /// Build the world through `stage`. The driver starts [`Phase::Idle`].
    pub fn new(
        mut stage: S,
        settings: CycleSettings,
        camera: CameraDirector,
        remap: TimeRemapper,
        mut rng: Box<dyn RngCore>,
    ) -> SwarmResult<Self> {
        settings.validate()?;
        let world = stage.create_world(rng.as_mut())?;
        let state = CycleState {
            global_hue: wrap_unit(settings.initial_hue),
            ..CycleState::default()
        };
        Ok(Self {
            stage,
            world,
            settings,
            camera,
            remap,
            rng,
            state,
            next_word: 0,
            next_timeline: 1,
            live: None,
            fade: None,
            fade_done: false,
            plans: Vec::new(),
        })
    }

    /// Current cycle snapshot.
    pub fn state(&self) -> &CycleState {
        &self.state
    }

    /// Current loop phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The animated world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The letter stage.
    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Plans submitted by the live cycle.
    pub fn plans(&self) -> &[MotionPlan] {
        &self.plans
    }

    /// Timeline of the live cycle, while animating.
    pub fn live_timeline(&self) -> Option<&Timeline> {
        self.live.as_ref()
    }

    /// Timeline of the completion fade, while completing.
    pub fn fade_timeline(&self) -> Option<&Timeline> {
        self.fade.as_ref()
    }

    fn fresh_id(&mut self) -> TimelineId {
        let id = TimelineId(self.next_timeline);
        self.next_timeline += 1;
        id
    }

    /// Start the next cycle.
    ///
    /// Only allowed from [`Phase::Idle`] or once the completion fade has finished; anything else
    /// is a [`SwarmError::Schedule`] and leaves the driver untouched.
    pub fn start(&mut self) -> SwarmResult<()> {
        let ready = match self.state.phase {
            Phase::Idle => true,
            Phase::Completing => self.fade_done,
            _ => false,
        };
        if !ready {
            return Err(SwarmError::schedule(format!(
                "cannot start a cycle while {:?}",
                self.state.phase
            )));
        }

        self.live = None;
        self.fade = None;
        self.fade_done = false;
        self.plans.clear();

        let cycle_id = self.state.cycle_id + 1;
        let span = tracing::info_span!("cycle", cycle_id);
        let _enter = span.enter();

        // Rasterizing
        self.state.phase = Phase::Rasterizing;
        self.world.pool.reset_all();
        let word_index = self.next_word;
        let word = self.settings.words[word_index].clone();
        self.next_word = (word_index + 1) % self.settings.words.len();
        let hue = self.state.global_hue;

        // Assigning
        self.state.phase = Phase::Assigning;
        let id = self.fresh_id();
        let mut timeline = Timeline::new(id);
        let staged = self.stage.create_letter(
            &word,
            hue,
            &mut self.world,
            &mut timeline,
            self.rng.as_mut(),
        );
        let plans = match staged {
            Ok(p) => p,
            Err(e) => {
                self.world.pool.reset_all();
                self.state.phase = Phase::Idle;
                return Err(e);
            }
        };
        let camera = self
            .camera
            .direct(self.rng.as_mut(), &mut timeline)
            .name
            .clone();
        let remap = self
            .remap
            .remap(self.rng.as_mut(), &mut timeline)
            .name
            .clone();
        timeline.to(
            Channel::CoverOpacity,
            Value::Scalar(0.0),
            self.settings.fade_secs,
            0.0,
            Ease::OutQuad,
        );
        timeline.on_complete(Cue::Completed);

        self.world.backdrop = Hsl::new(
            hue,
            self.settings.backdrop_saturation,
            self.settings.backdrop_lightness,
        );

        tracing::info!(
            word = %word,
            particles = plans.len(),
            camera = %camera,
            remap = %remap,
            hue,
            duration = timeline.duration(),
            "cycle started"
        );

        self.state = CycleState {
            cycle_id,
            word_index,
            word,
            active_particles: plans.len(),
            camera: Some(camera),
            remap: Some(remap),
            global_hue: wrap_unit(hue + self.settings.hue_step),
            phase: Phase::Animating,
        };
        self.plans = plans;
        self.live = Some(timeline);
        Ok(())
    }

    /// Advance playback by `dt` wall seconds and react to whatever fired.
    pub fn tick(&mut self, dt: f64) -> SwarmResult<()> {
        let events = match self.state.phase {
            Phase::Animating => match self.live.as_mut() {
                Some(tl) => tl.advance(dt, &mut self.world),
                None => Vec::new(),
            },
            Phase::Completing => match self.fade.as_mut() {
                Some(tl) => tl.advance(dt, &mut self.world),
                None => Vec::new(),
            },
            _ => Vec::new(),
        };
        for ev in events {
            self.deliver(ev)?;
        }
        Ok(())
    }

    /// React to a playback event. Returns `false` when the event was stale and ignored.
    pub fn deliver(&mut self, event: TimelineEvent) -> SwarmResult<bool> {
        let live = self.live.as_ref().map(Timeline::id);
        let fade = self.fade.as_ref().map(Timeline::id);

        match event.cue {
            Cue::Completed
                if live == Some(event.timeline) && self.state.phase == Phase::Animating =>
            {
                self.begin_completion();
                Ok(true)
            }
            Cue::Completed
                if fade == Some(event.timeline) && self.state.phase == Phase::Completing =>
            {
                self.fade_done = true;
                tracing::debug!(cycle_id = self.state.cycle_id, "cover fade finished");
                self.start()?;
                Ok(true)
            }
            Cue::Marker(m) if live == Some(event.timeline) || fade == Some(event.timeline) => {
                tracing::trace!(marker = m, "marker reached");
                Ok(true)
            }
            _ => {
                tracing::debug!(
                    timeline = event.timeline.0,
                    cue = ?event.cue,
                    live = ?live.map(|t| t.0),
                    "ignoring stale event"
                );
                Ok(false)
            }
        }
    }

    fn begin_completion(&mut self) {
        self.live = None;
        let id = self.fresh_id();
        let mut fade = Timeline::new(id);
        fade.to(
            Channel::CoverOpacity,
            Value::Scalar(1.0),
            self.settings.fade_secs,
            0.0,
            Ease::OutQuad,
        );
        fade.on_complete(Cue::Completed);
        self.fade = Some(fade);
        self.fade_done = false;
        self.state.phase = Phase::Completing;
        tracing::debug!(cycle_id = self.state.cycle_id, "cycle complete, fading out");
    }

    /// Drop the live and fade timelines, hide every particle and return to [`Phase::Idle`].
    pub fn cancel(&mut self) {
        self.live = None;
        self.fade = None;
        self.fade_done = false;
        self.plans.clear();
        self.world.pool.reset_all();
        self.state.active_particles = 0;
        self.state.phase = Phase::Idle;
        tracing::info!(cycle_id = self.state.cycle_id, "cycle cancelled");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/choreo/cycle.rs"]
mod tests;
