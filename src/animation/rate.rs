use crate::animation::ease::Ease;
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::foundation::math::lerp;

/// When a [`RateOverlay`] starts counting its segment delays.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RateAnchor {
    /// As soon as the outer timeline starts playing.
    Start,
    /// When the outer timeline's local time first reaches `at` seconds.
    LocalTime {
        /// Local trigger time in seconds.
        at: f64,
    },
}

/// One rate tween. Delay and duration are wall seconds, measured from the anchor.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RateSegment {
    /// Wall seconds after the anchor fires.
    pub delay: f64,
    /// Wall seconds the tween lasts.
    pub duration: f64,
    /// Target rate.
    pub to: f64,
    /// Easing of the rate curve.
    pub ease: Ease,
}

/// Nested schedule whose only target is the playback rate of the timeline it is attached to.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RateOverlay {
    /// Rate applied when the overlay is attached.
    pub initial_rate: Option<f64>,
    /// Trigger for the segment clock.
    pub anchor: RateAnchor,
    /// Rate tweens, each starting from whatever the rate is when it begins.
    pub segments: Vec<RateSegment>,
}

impl RateOverlay {
    /// Overlay that pins the rate and never changes it.
    pub fn constant(rate: f64) -> Self {
        Self {
            initial_rate: Some(rate),
            anchor: RateAnchor::Start,
            segments: Vec::new(),
        }
    }

    /// Reject non-finite values, negative times and rates that are not strictly positive.
    ///
    /// A zero rate would stop local time for good and the timeline would never complete.
    pub fn validate(&self) -> SwarmResult<()> {
        if let Some(r) = self.initial_rate
            && (!r.is_finite() || r <= 0.0)
        {
            return Err(SwarmError::validation("initial rate must be finite and > 0"));
        }
        if let RateAnchor::LocalTime { at } = self.anchor
            && (!at.is_finite() || at < 0.0)
        {
            return Err(SwarmError::validation("rate anchor time must be finite and >= 0"));
        }
        for s in &self.segments {
            let ok = [s.delay, s.duration]
                .iter()
                .all(|v| v.is_finite() && *v >= 0.0);
            if !ok {
                return Err(SwarmError::validation(
                    "rate segment delay and duration must be finite and >= 0",
                ));
            }
            if !s.to.is_finite() || s.to <= 0.0 {
                return Err(SwarmError::validation(format!(
                    "rate segment target must be finite and > 0, got {}",
                    s.to
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SegmentState {
    Pending,
    Active { from: f64 },
    Done,
}

/// Playback state of a [`RateOverlay`].
#[derive(Clone, Debug)]
pub(crate) struct RateTrack {
    overlay: RateOverlay,
    fired_at_wall: Option<f64>,
    states: Vec<SegmentState>,
}

impl RateTrack {
    pub(crate) fn new(mut overlay: RateOverlay) -> Self {
        overlay
            .segments
            .sort_by(|a, b| a.delay.total_cmp(&b.delay));
        let states = vec![SegmentState::Pending; overlay.segments.len()];
        Self {
            overlay,
            fired_at_wall: None,
            states,
        }
    }

    pub(crate) fn initial_rate(&self) -> Option<f64> {
        self.overlay.initial_rate
    }

    /// Arm the segment clock if the anchor condition holds.
    pub(crate) fn arm(&mut self, wall: f64, local: f64) {
        if self.fired_at_wall.is_some() {
            return;
        }
        let fire = match self.overlay.anchor {
            RateAnchor::Start => true,
            RateAnchor::LocalTime { at } => local >= at,
        };
        if fire {
            tracing::trace!(wall, local, "rate overlay armed");
            self.fired_at_wall = Some(wall);
        }
    }

    /// Rate to use at wall time `wall`, given the rate currently in effect.
    pub(crate) fn rate_at(&mut self, wall: f64, current: f64) -> f64 {
        let Some(t0) = self.fired_at_wall else {
            return current;
        };
        let since = wall - t0;
        let mut rate = current;
        for (seg, state) in self.overlay.segments.iter().zip(self.states.iter_mut()) {
            if since < seg.delay {
                continue;
            }
            let from = match *state {
                SegmentState::Done => continue,
                SegmentState::Pending => rate,
                SegmentState::Active { from } => from,
            };
            let p = if seg.duration <= 0.0 {
                1.0
            } else {
                (since - seg.delay) / seg.duration
            };
            if p >= 1.0 {
                rate = seg.to;
                *state = SegmentState::Done;
            } else {
                rate = lerp(from, seg.to, seg.ease.apply(p));
                *state = SegmentState::Active { from };
            }
        }
        rate
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.fired_at_wall.is_some()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/rate.rs"]
mod tests;
