//! Per-particle flight plans.
//!
//! Every assigned particle flies from a random point far behind the glyph plane, along a curve
//! bent through a perturbed midpoint, onto the world-space image of its pixel. Start times follow
//! a diagonal sweep: the eased assignment index sets a base delay and a random jitter is added on
//! top, so activation ripples across the glyph instead of popping in at once.

use std::f64::consts::PI;

use rand::Rng;

use crate::animation::ease::Ease;
use crate::animation::schedule::{Channel, Schedule, Value};
use crate::foundation::core::{GridSize, Hsl, PixelCoord, SlotId, Vec3};
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::foundation::math::{ThroughCurve, wrap_unit};
use crate::particles::mapper::Assignment;
use crate::particles::pool::ParticlePool;

/// Z travel of the whole particle group during a cycle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SwarmDrift {
    /// Group z at cycle start.
    pub from_z: f64,
    /// Group z at the end of the drift.
    pub to_z: f64,
    /// Drift duration in seconds.
    pub secs: f64,
    /// Drift easing.
    pub ease: Ease,
}

impl Default for SwarmDrift {
    fn default() -> Self {
        Self {
            from_z: -5000.0,
            to_z: 6000.0,
            secs: 12.0,
            ease: Ease::InQuart,
        }
    }
}

/// Tunables of the planner.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlannerParams {
    /// World units per canvas pixel.
    pub world_scale: f64,
    /// Assignment count at which the sweep reaches its full base delay.
    pub sweep_cap: f64,
    /// Maximum base delay in seconds (`K1`).
    pub sweep_secs: f64,
    /// Maximum random jitter added to the base delay in seconds (`K2`).
    pub jitter_secs: f64,
    /// Curve shaping `cnt / sweep_cap` into the base delay.
    pub sweep_ease: Ease,
    /// Center of the origin box.
    pub origin_center: Vec3,
    /// Full extent of the origin box per axis.
    pub origin_extent: Vec3,
    /// Fixed offset added to the path midpoint.
    pub mid_offset: Vec3,
    /// Random offset added to the path midpoint, scaled per axis by `[0, 1)`.
    pub mid_jitter: Vec3,
    /// Flight duration in seconds.
    pub flight_secs: f64,
    /// Flight easing.
    pub flight_ease: Ease,
    /// Full range of the initial spin in radians, centered on zero.
    pub spin_range: f64,
    /// Spin decay duration in seconds.
    pub spin_secs: f64,
    /// Spin decay easing.
    pub spin_ease: Ease,
    /// Hue range spread across the canvas width.
    pub hue_spread: f64,
    /// Tint saturation.
    pub saturation: f64,
    /// Minimum tint lightness.
    pub lightness_min: f64,
    /// Random lightness added on top of the minimum.
    pub lightness_jitter: f64,
    /// Group drift, `None` to keep the swarm still.
    pub drift: Option<SwarmDrift>,
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            world_scale: 30.0,
            sweep_cap: 1600.0,
            sweep_secs: 3.0,
            jitter_secs: 1.5,
            sweep_ease: Ease::InOutCubic,
            origin_center: Vec3::new(-500.0, 0.0, 10_000.0),
            origin_extent: Vec3::new(2000.0, 1000.0, 0.0),
            mid_offset: Vec3::new(300.0, 0.0, 0.0),
            mid_jitter: Vec3::new(0.0, 500.0, 0.0),
            flight_secs: 7.0,
            flight_ease: Ease::InOutExpo,
            spin_range: 10.0 * PI,
            spin_secs: 6.0,
            spin_ease: Ease::InOutCubic,
            hue_spread: 0.2,
            saturation: 0.5,
            lightness_min: 0.6,
            lightness_jitter: 0.4,
            drift: Some(SwarmDrift::default()),
        }
    }
}

impl PlannerParams {
    /// Reject non-finite or non-positive constants.
    pub fn validate(&self) -> SwarmResult<()> {
        let positive = [
            ("world_scale", self.world_scale),
            ("sweep_cap", self.sweep_cap),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(SwarmError::validation(format!(
                    "planner {name} must be finite and > 0"
                )));
            }
        }
        let non_negative = [
            ("sweep_secs", self.sweep_secs),
            ("jitter_secs", self.jitter_secs),
            ("flight_secs", self.flight_secs),
            ("spin_secs", self.spin_secs),
        ];
        for (name, v) in non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(SwarmError::validation(format!(
                    "planner {name} must be finite and >= 0"
                )));
            }
        }
        let vectors = [
            self.origin_center,
            self.origin_extent,
            self.mid_offset,
            self.mid_jitter,
        ];
        if !vectors.iter().all(|v| v.is_finite()) {
            return Err(SwarmError::validation("planner vectors must be finite"));
        }
        if let Some(d) = self.drift
            && (!d.secs.is_finite()
                || d.secs < 0.0
                || !d.from_z.is_finite()
                || !d.to_z.is_finite())
        {
            return Err(SwarmError::validation("swarm drift must be finite"));
        }
        Ok(())
    }

    /// Latest time any particle segment can end: full sweep, full jitter, longest motion.
    pub fn max_particle_end(&self) -> f64 {
        self.sweep_secs + self.jitter_secs + self.flight_secs.max(self.spin_secs)
    }
}

/// Computed flight of one particle for one cycle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionPlan {
    /// Particle being animated.
    pub slot: SlotId,
    /// Pixel it lands on.
    pub pixel: PixelCoord,
    /// Seconds after cycle zero at which it appears and starts moving.
    pub delay: f64,
    /// Start of the path.
    pub origin: Vec3,
    /// On-curve midpoint of the path.
    pub mid: Vec3,
    /// World image of `pixel`.
    pub target: Vec3,
    /// Initial rotation.
    pub rotation_from: Vec3,
    /// Final rotation.
    pub rotation_to: Vec3,
    /// Material tint.
    pub tint: Hsl,
}

impl MotionPlan {
    /// Path the particle follows.
    pub fn curve(&self) -> ThroughCurve {
        ThroughCurve::new(self.origin, self.mid, self.target)
    }
}

/// World-space image of a canvas pixel: centered on the canvas midpoint, `y` flipped upwards.
pub fn target_point(pixel: PixelCoord, canvas: GridSize, world_scale: f64) -> Vec3 {
    let x = (f64::from(pixel.col) - f64::from(canvas.cols) / 2.0) * world_scale;
    let y = (f64::from(canvas.rows) / 2.0 - f64::from(pixel.row)) * world_scale;
    Vec3::new(x, y, 0.0)
}

/// Start delay of the `cnt`-th assigned particle; `jitter` is a sample in `[0, 1)`.
pub fn sweep_delay(cnt: usize, params: &PlannerParams, jitter: f64) -> f64 {
    let base = params.sweep_ease.apply(cnt as f64 / params.sweep_cap);
    base * params.sweep_secs + jitter * params.jitter_secs
}

/// Tint of `pixel`: hue follows the column across the canvas, offset by the cycle hue.
pub fn tint_for(
    pixel: PixelCoord,
    canvas: GridSize,
    global_hue: f64,
    params: &PlannerParams,
    lightness: f64,
) -> Hsl {
    let total = canvas.cells() as f64;
    let across = f64::from(pixel.col) * f64::from(canvas.rows) / total;
    Hsl::new(
        wrap_unit(global_hue + (across - 0.5) * params.hue_spread),
        params.saturation,
        params.lightness_min + params.lightness_jitter * lightness,
    )
}

fn centered<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.random::<f64>() - 0.5,
        rng.random::<f64>() - 0.5,
        rng.random::<f64>() - 0.5,
    )
}

fn unit<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(rng.random(), rng.random(), rng.random())
}

/// Plan every assignment, in assignment order.
#[tracing::instrument(skip_all, fields(particles = assignments.len()))]
pub fn plan<R: Rng + ?Sized>(
    assignments: &[Assignment],
    canvas: GridSize,
    global_hue: f64,
    params: &PlannerParams,
    rng: &mut R,
) -> Vec<MotionPlan> {
    assignments
        .iter()
        .enumerate()
        .map(|(cnt, a)| {
            let target = target_point(a.pixel, canvas, params.world_scale);
            let origin = params.origin_center + params.origin_extent * centered(rng);
            let mid = (origin + target) * 0.5 + params.mid_offset + params.mid_jitter * unit(rng);
            let spin = params.spin_range * (rng.random::<f64>() - 0.5);
            MotionPlan {
                slot: a.slot,
                pixel: a.pixel,
                delay: sweep_delay(cnt, params, rng.random()),
                origin,
                mid,
                target,
                rotation_from: Vec3::new(0.0, 0.0, spin),
                rotation_to: Vec3::ZERO,
                tint: tint_for(a.pixel, canvas, global_hue, params, rng.random()),
            }
        })
        .collect()
}

/// Stage the plans: park each slot at its origin, hidden, and schedule its reveal, spin decay
/// and flight relative to cycle zero. Also schedules the group drift.
///
/// Returns the number of particles submitted.
pub fn submit<S: Schedule + ?Sized>(
    plans: &[MotionPlan],
    params: &PlannerParams,
    pool: &mut ParticlePool,
    schedule: &mut S,
) -> usize {
    let mut submitted = 0usize;
    for p in plans {
        let Some(slot) = pool.slot_mut(p.slot) else {
            tracing::warn!(slot = p.slot.0, "plan refers to a slot outside the pool");
            continue;
        };
        slot.position = p.origin;
        slot.rotation = p.rotation_from;
        slot.tint = p.tint;
        slot.visible = false;

        schedule.set(Channel::ParticleVisible(p.slot), Value::Flag(true), p.delay);
        schedule.to(
            Channel::ParticleRotationZ(p.slot),
            Value::Scalar(p.rotation_to.z),
            params.spin_secs,
            p.delay,
            params.spin_ease,
        );
        schedule.path(
            Channel::ParticlePosition(p.slot),
            p.curve(),
            params.flight_secs,
            p.delay,
            params.flight_ease,
        );
        submitted += 1;
    }

    if let Some(d) = params.drift {
        schedule.set(Channel::SwarmOffset, Value::Vec3(Vec3::new(0.0, 0.0, d.from_z)), 0.0);
        schedule.to(
            Channel::SwarmOffset,
            Value::Vec3(Vec3::new(0.0, 0.0, d.to_z)),
            d.secs,
            0.0,
            d.ease,
        );
    }
    submitted
}

#[cfg(test)]
#[path = "../../tests/unit/particles/planner.rs"]
mod tests;
