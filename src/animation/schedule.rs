//! Scheduler contract shared by the choreography stages.
//!
//! Planner, camera director and time remapper only ever talk to a [`Schedule`]; the frame loop
//! plays the schedule into a [`Stage`]. Everything is addressed through typed [`Channel`]s so a
//! schedule never holds references into the world it animates.

use crate::animation::ease::Ease;
use crate::animation::rate::RateOverlay;
use crate::foundation::core::{SlotId, Vec3};
use crate::foundation::math::{ThroughCurve, lerp};

/// Animatable property of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Particle position in swarm-local world units.
    ParticlePosition(SlotId),
    /// Particle rotation around the view axis, radians.
    ParticleRotationZ(SlotId),
    /// Particle visibility flag.
    ParticleVisible(SlotId),
    /// Camera eye position.
    CameraPosition,
    /// Vertical field of view, degrees.
    CameraFov,
    /// Offset applied to the whole particle group.
    SwarmOffset,
    /// Opacity of the black cover overlay, `0` = hidden.
    CoverOpacity,
}

/// Value written into a [`Channel`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    /// Scalar property.
    Scalar(f64),
    /// 3D vector property.
    Vec3(Vec3),
    /// Boolean property; flags are only ever set, never tweened.
    Flag(bool),
}

impl Value {
    /// Interpolate between two values of the same kind. Mismatched kinds and flags snap to `b`
    /// once `t` reaches 1 and hold `a` before that.
    pub fn lerp(a: Value, b: Value, t: f64) -> Value {
        match (a, b) {
            (Value::Scalar(x), Value::Scalar(y)) => Value::Scalar(lerp(x, y, t)),
            (Value::Vec3(x), Value::Vec3(y)) => Value::Vec3(x.lerp(y, t)),
            _ if t >= 1.0 => b,
            _ => a,
        }
    }

    /// Scalar payload, if any.
    pub fn as_scalar(self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Vector payload, if any.
    pub fn as_vec3(self) -> Option<Vec3> {
        match self {
            Value::Vec3(v) => Some(v),
            _ => None,
        }
    }

    /// Flag payload, if any.
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Value::Flag(v) => Some(v),
            _ => None,
        }
    }
}

/// Named callback point. Cues are returned from playback as events instead of running closures,
/// so the owner decides what a cue means and whether it is still current.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// The timeline reached its natural end.
    Completed,
    /// Free-form marker, useful for tests and tooling.
    Marker(u32),
}

/// Identity of one timeline instance; events carry it so stale ones can be told apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimelineId(pub u64);

/// A cue that fired during playback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineEvent {
    /// Timeline that emitted the cue.
    pub timeline: TimelineId,
    /// The cue itself.
    pub cue: Cue,
    /// Timeline-local time the cue was scheduled at.
    pub at: f64,
}

/// Write side of the scheduler contract. All times are seconds relative to the timeline's zero.
pub trait Schedule {
    /// Snap `channel` to `value` at `at`.
    fn set(&mut self, channel: Channel, value: Value, at: f64);

    /// Tween `channel` from its current value to `value`.
    fn to(&mut self, channel: Channel, value: Value, duration: f64, at: f64, ease: Ease);

    /// Move a vector channel along `curve`.
    fn path(&mut self, channel: Channel, curve: ThroughCurve, duration: f64, at: f64, ease: Ease);

    /// Emit `cue` once local time reaches `at`.
    fn call(&mut self, cue: Cue, at: f64);

    /// Compose a child schedule into this one, offset by `at`.
    fn nest(&mut self, child: Self, at: f64)
    where
        Self: Sized;

    /// Set the playback rate (local seconds per wall second).
    fn set_rate(&mut self, rate: f64);

    /// Install a nested schedule that drives this schedule's playback rate.
    fn attach_rate_overlay(&mut self, overlay: RateOverlay);

    /// Emit `cue` when the schedule completes naturally.
    fn on_complete(&mut self, cue: Cue);
}

/// Read/write access to the animated world.
pub trait Stage {
    /// Current value of `channel`, if the stage knows it.
    fn read(&self, channel: Channel) -> Option<Value>;

    /// Apply `value` to `channel`. Unknown channels are ignored.
    fn write(&mut self, channel: Channel, value: Value);
}

#[cfg(test)]
#[path = "../../tests/unit/animation/schedule.rs"]
mod tests;
