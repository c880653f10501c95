use crate::animation::ease::Ease;
use crate::animation::rate::{RateOverlay, RateTrack};
use crate::animation::schedule::{Channel, Cue, Schedule, Stage, TimelineEvent, TimelineId, Value};
use crate::foundation::math::ThroughCurve;

/// Floor applied to overlay-driven rates so local time keeps moving.
const MIN_RATE: f64 = 1e-3;

#[derive(Clone, Debug)]
enum SegmentKind {
    Set(Value),
    Tween {
        from: Option<Value>,
        to: Value,
        ease: Ease,
    },
    Path {
        curve: ThroughCurve,
        ease: Ease,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SegmentState {
    Pending,
    Running,
    Done,
}

#[derive(Clone, Debug)]
struct Segment {
    channel: Channel,
    start: f64,
    duration: f64,
    kind: SegmentKind,
    state: SegmentState,
}

impl Segment {
    fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Clone, Debug)]
struct ScheduledCue {
    at: f64,
    cue: Cue,
    fired: bool,
}

/// In-process animation scheduler.
///
/// Segments are applied in insertion order every step, so a later segment on the same channel
/// overrides an earlier one while both are running. Playback rate scales how fast local time
/// advances relative to wall time and may be changed mid-run by a [`RateOverlay`] without touching
/// any scheduled segment.
#[derive(Clone, Debug)]
pub struct Timeline {
    id: TimelineId,
    segments: Vec<Segment>,
    cues: Vec<ScheduledCue>,
    complete_cue: Option<Cue>,
    rate: f64,
    overlay: Option<RateTrack>,
    local: f64,
    wall: f64,
    started: bool,
    completed: bool,
}

impl Timeline {
    /// Empty timeline at rate 1.
    pub fn new(id: TimelineId) -> Self {
        Self {
            id,
            segments: Vec::new(),
            cues: Vec::new(),
            complete_cue: None,
            rate: 1.0,
            overlay: None,
            local: 0.0,
            wall: 0.0,
            started: false,
            completed: false,
        }
    }

    /// Identity carried by every emitted event.
    pub fn id(&self) -> TimelineId {
        self.id
    }

    /// Natural duration in local seconds: the latest segment end or cue time.
    pub fn duration(&self) -> f64 {
        let seg_end = self.segments.iter().map(Segment::end).fold(0.0, f64::max);
        let cue_end = self.cues.iter().map(|c| c.at).fold(0.0, f64::max);
        seg_end.max(cue_end)
    }

    /// Local time played so far.
    pub fn local_time(&self) -> f64 {
        self.local
    }

    /// Wall time played so far.
    pub fn wall_time(&self) -> f64 {
        self.wall
    }

    /// Current playback rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Number of scheduled segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// `true` once the completion event has been emitted.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// `true` when a rate overlay is attached.
    pub fn has_rate_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Advance by `dt` wall seconds, writing animated values into `stage`.
    ///
    /// Returns the cues that fired during this step, ordered by their scheduled time. The
    /// completion cue is emitted exactly once; afterwards this is a no-op.
    pub fn advance(&mut self, dt: f64, stage: &mut impl Stage) -> Vec<TimelineEvent> {
        if self.completed {
            return Vec::new();
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if !self.started {
            self.started = true;
            if let Some(track) = self.overlay.as_mut() {
                track.arm(0.0, 0.0);
            }
        }

        if let Some(track) = self.overlay.as_mut() {
            // Overlays attached without validation may still target zero.
            self.rate = track.rate_at(self.wall, self.rate).max(MIN_RATE);
        }
        self.wall += dt;
        self.local += dt * self.rate;

        if let Some(track) = self.overlay.as_mut()
            && !track.is_armed()
        {
            track.arm(self.wall, self.local);
        }

        self.apply(stage);

        let mut events: Vec<TimelineEvent> = Vec::new();
        for c in self.cues.iter_mut() {
            if !c.fired && c.at <= self.local {
                c.fired = true;
                events.push(TimelineEvent {
                    timeline: self.id,
                    cue: c.cue,
                    at: c.at,
                });
            }
        }
        events.sort_by(|a, b| a.at.total_cmp(&b.at));

        let duration = self.duration();
        if self.local >= duration {
            self.completed = true;
            tracing::debug!(
                timeline = self.id.0,
                duration,
                wall = self.wall,
                "timeline complete"
            );
            if let Some(cue) = self.complete_cue {
                events.push(TimelineEvent {
                    timeline: self.id,
                    cue,
                    at: duration,
                });
            }
        }
        events
    }

    fn apply(&mut self, stage: &mut impl Stage) {
        let local = self.local;
        for seg in self.segments.iter_mut() {
            if seg.state == SegmentState::Done || local < seg.start {
                continue;
            }
            let p = if seg.duration <= 0.0 {
                1.0
            } else {
                ((local - seg.start) / seg.duration).min(1.0)
            };
            match &mut seg.kind {
                SegmentKind::Set(v) => stage.write(seg.channel, *v),
                SegmentKind::Tween { from, to, ease } => {
                    let start = *from.get_or_insert_with(|| stage.read(seg.channel).unwrap_or(*to));
                    stage.write(seg.channel, Value::lerp(start, *to, ease.apply(p)));
                }
                SegmentKind::Path { curve, ease } => {
                    stage.write(seg.channel, Value::Vec3(curve.sample(ease.apply(p))));
                }
            }
            seg.state = if p >= 1.0 {
                SegmentState::Done
            } else {
                SegmentState::Running
            };
        }
    }

    fn push(&mut self, channel: Channel, start: f64, duration: f64, kind: SegmentKind) {
        self.segments.push(Segment {
            channel,
            start: start.max(0.0),
            duration: duration.max(0.0),
            kind,
            state: SegmentState::Pending,
        });
    }
}

impl Schedule for Timeline {
    fn set(&mut self, channel: Channel, value: Value, at: f64) {
        self.push(channel, at, 0.0, SegmentKind::Set(value));
    }

    fn to(&mut self, channel: Channel, value: Value, duration: f64, at: f64, ease: Ease) {
        self.push(
            channel,
            at,
            duration,
            SegmentKind::Tween {
                from: None,
                to: value,
                ease,
            },
        );
    }

    fn path(&mut self, channel: Channel, curve: ThroughCurve, duration: f64, at: f64, ease: Ease) {
        self.push(channel, at, duration, SegmentKind::Path { curve, ease });
    }

    fn call(&mut self, cue: Cue, at: f64) {
        self.cues.push(ScheduledCue {
            at: at.max(0.0),
            cue,
            fired: false,
        });
    }

    /// Children are flattened at rate 1; only the outermost timeline's rate applies.
    fn nest(&mut self, child: Self, at: f64) {
        let at = at.max(0.0);
        for mut seg in child.segments {
            seg.start += at;
            seg.state = SegmentState::Pending;
            self.segments.push(seg);
        }
        for c in child.cues {
            self.call(c.cue, c.at + at);
        }
    }

    fn set_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
    }

    fn attach_rate_overlay(&mut self, overlay: RateOverlay) {
        let track = RateTrack::new(overlay);
        if let Some(r) = track.initial_rate() {
            self.set_rate(r);
        }
        self.overlay = Some(track);
    }

    fn on_complete(&mut self, cue: Cue) {
        self.complete_cue = Some(cue);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
