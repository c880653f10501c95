use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::animation::rate::RateOverlay;
use crate::animation::schedule::Cue;
use crate::particles::mapper::{Coverage, assign};
use crate::particles::mask::AlphaMask;

#[derive(Debug, PartialEq)]
enum Op {
    Set(Channel, Value, f64),
    To(Channel, Value, f64, f64, Ease),
    Path(Channel, f64, f64, Ease),
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
}

impl Schedule for Recorder {
    fn set(&mut self, channel: Channel, value: Value, at: f64) {
        self.ops.push(Op::Set(channel, value, at));
    }

    fn to(&mut self, channel: Channel, value: Value, duration: f64, at: f64, ease: Ease) {
        self.ops.push(Op::To(channel, value, duration, at, ease));
    }

    fn path(&mut self, channel: Channel, _curve: ThroughCurve, duration: f64, at: f64, ease: Ease) {
        self.ops.push(Op::Path(channel, duration, at, ease));
    }

    fn call(&mut self, _cue: Cue, _at: f64) {}

    fn nest(&mut self, child: Self, _at: f64) {
        self.ops.extend(child.ops);
    }

    fn set_rate(&mut self, _rate: f64) {}

    fn attach_rate_overlay(&mut self, _overlay: RateOverlay) {}

    fn on_complete(&mut self, _cue: Cue) {}
}

fn grid(cols: u32, rows: u32) -> GridSize {
    GridSize { cols, rows }
}

fn everything(cols: u32, rows: u32) -> (ParticlePool, Vec<Assignment>) {
    let mut rng = StdRng::seed_from_u64(11);
    let pool = ParticlePool::build(grid(cols, rows), 8, &mut rng).unwrap();
    let mask = AlphaMask::filled(pool.layout(), false);
    let a = assign(&mask, &pool, Coverage::Transparent);
    (pool, a)
}

#[test]
fn target_maps_pixel_to_centered_world_plane() {
    let canvas = grid(250, 40);
    assert_eq!(
        target_point(PixelCoord::new(125, 20), canvas, 30.0),
        Vec3::ZERO
    );
    assert_eq!(
        target_point(PixelCoord::new(0, 0), canvas, 30.0),
        Vec3::new(-3750.0, 600.0, 0.0)
    );
    // Rows grow downwards on the canvas, y grows upwards in the world.
    let a = target_point(PixelCoord::new(10, 5), canvas, 30.0);
    let b = target_point(PixelCoord::new(10, 6), canvas, 30.0);
    assert_eq!(a.y - b.y, 30.0);
}

#[test]
fn sweep_delay_is_bounded_and_monotonic_without_jitter() {
    let p = PlannerParams::default();
    let mut prev = -1.0;
    for cnt in (0..4000).step_by(37) {
        let d = sweep_delay(cnt, &p, 0.0);
        assert!(d >= prev);
        assert!(d <= p.sweep_secs);
        prev = d;
    }
    assert_eq!(sweep_delay(0, &p, 0.0), 0.0);
    assert_eq!(sweep_delay(1600, &p, 0.0), 3.0);
    assert_eq!(sweep_delay(99_999, &p, 0.999), 3.0 + 0.999 * 1.5);
}

#[test]
fn delays_trend_upwards_along_the_sweep() {
    let (_pool, a) = everything(64, 40);
    let mut rng = StdRng::seed_from_u64(3);
    let plans = plan(&a, grid(64, 40), 0.6, &PlannerParams::default(), &mut rng);
    assert_eq!(plans.len(), a.len());

    let mean = |xs: &[MotionPlan]| xs.iter().map(|p| p.delay).sum::<f64>() / xs.len() as f64;
    let head = mean(&plans[..200]);
    let tail = mean(&plans[plans.len() - 200..]);
    assert!(tail > head + 1.0, "head={head} tail={tail}");

    let max = PlannerParams::default().max_particle_end();
    assert!(plans.iter().all(|p| p.delay >= 0.0 && p.delay <= 4.5));
    assert!(max >= 4.5 + 7.0);
}

#[test]
fn plans_follow_assignment_order_and_targets() {
    let (_pool, a) = everything(20, 10);
    let mut rng = StdRng::seed_from_u64(9);
    let params = PlannerParams::default();
    let plans = plan(&a, grid(20, 10), 0.0, &params, &mut rng);
    for (p, asg) in plans.iter().zip(&a) {
        assert_eq!(p.slot, asg.slot);
        assert_eq!(p.pixel, asg.pixel);
        assert_eq!(p.target, target_point(asg.pixel, grid(20, 10), 30.0));
        assert_eq!(p.rotation_to, Vec3::ZERO);
        assert!(p.rotation_from.z.abs() <= 5.0 * PI);
    }
}

#[test]
fn origins_come_from_the_far_box() {
    let (_pool, a) = everything(30, 10);
    let mut rng = StdRng::seed_from_u64(21);
    let plans = plan(&a, grid(30, 10), 0.0, &PlannerParams::default(), &mut rng);
    for p in &plans {
        assert!((-1500.0..=500.0).contains(&p.origin.x));
        assert!((-500.0..=500.0).contains(&p.origin.y));
        assert_eq!(p.origin.z, 10_000.0);
    }
    // Origins are drawn fresh per particle.
    assert_ne!(plans[0].origin, plans[1].origin);
}

#[test]
fn path_passes_through_origin_mid_and_target() {
    let (_pool, a) = everything(8, 4);
    let mut rng = StdRng::seed_from_u64(4);
    let plans = plan(&a, grid(8, 4), 0.0, &PlannerParams::default(), &mut rng);
    let p = plans[5];
    let c = p.curve();
    assert!((c.sample(0.0) - p.origin).length() < 1e-9);
    assert!((c.sample(0.5) - p.mid).length() < 1e-9);
    assert!((c.sample(1.0) - p.target).length() < 1e-9);

    let midpoint = (p.origin + p.target) * 0.5;
    let off = p.mid - midpoint;
    assert!((off.x - 300.0).abs() < 1e-9);
    assert!((0.0..500.0).contains(&off.y));
    assert_eq!(off.z, 0.0);
}

#[test]
fn tint_spreads_hue_across_columns() {
    let p = PlannerParams::default();
    let canvas = grid(100, 10);
    let left = tint_for(PixelCoord::new(0, 3), canvas, 0.5, &p, 0.0);
    let right = tint_for(PixelCoord::new(99, 3), canvas, 0.5, &p, 1.0);
    assert!((left.h - 0.4).abs() < 1e-9);
    assert!((right.h - (0.5 + (0.99 - 0.5) * 0.2)).abs() < 1e-9);
    assert_eq!(left.s, 0.5);
    assert_eq!(left.l, 0.6);
    assert!((right.l - 1.0).abs() < 1e-12);

    // Hue wraps into [0, 1).
    let wrapped = tint_for(PixelCoord::new(0, 0), canvas, 0.0, &p, 0.0);
    assert!((wrapped.h - 0.9).abs() < 1e-9);
}

#[test]
fn submit_parks_slots_and_schedules_reveal_spin_and_flight() {
    let (mut pool, a) = everything(6, 3);
    let mut rng = StdRng::seed_from_u64(8);
    let params = PlannerParams::default();
    let plans = plan(&a[..4], grid(6, 3), 0.2, &params, &mut rng);

    pool.slot_mut(SlotId(0)).unwrap().visible = true;
    let mut rec = Recorder::default();
    assert_eq!(submit(&plans, &params, &mut pool, &mut rec), 4);

    for p in &plans {
        let slot = pool.slot(p.slot).unwrap();
        assert!(!slot.visible);
        assert_eq!(slot.position, p.origin);
        assert_eq!(slot.rotation, p.rotation_from);
        assert_eq!(slot.tint, p.tint);
    }

    let first = plans[0];
    assert_eq!(
        rec.ops[0],
        Op::Set(
            Channel::ParticleVisible(first.slot),
            Value::Flag(true),
            first.delay
        )
    );
    assert_eq!(
        rec.ops[1],
        Op::To(
            Channel::ParticleRotationZ(first.slot),
            Value::Scalar(0.0),
            6.0,
            first.delay,
            Ease::InOutCubic
        )
    );
    assert_eq!(
        rec.ops[2],
        Op::Path(
            Channel::ParticlePosition(first.slot),
            7.0,
            first.delay,
            Ease::InOutExpo
        )
    );

    // Drift comes last: snap to -5000 then ease to +6000.
    let n = rec.ops.len();
    assert_eq!(n, 4 * 3 + 2);
    assert_eq!(
        rec.ops[n - 2],
        Op::Set(
            Channel::SwarmOffset,
            Value::Vec3(Vec3::new(0.0, 0.0, -5000.0)),
            0.0
        )
    );
    assert_eq!(
        rec.ops[n - 1],
        Op::To(
            Channel::SwarmOffset,
            Value::Vec3(Vec3::new(0.0, 0.0, 6000.0)),
            12.0,
            0.0,
            Ease::InQuart
        )
    );
}

#[test]
fn submit_without_drift_only_schedules_particles() {
    let (mut pool, a) = everything(4, 2);
    let mut rng = StdRng::seed_from_u64(8);
    let params = PlannerParams {
        drift: None,
        ..PlannerParams::default()
    };
    let plans = plan(&a, grid(4, 2), 0.2, &params, &mut rng);
    let mut rec = Recorder::default();
    submit(&plans, &params, &mut pool, &mut rec);
    assert_eq!(rec.ops.len(), 8 * 3);
}

#[test]
fn empty_assignment_list_plans_nothing() {
    let mut rng = StdRng::seed_from_u64(1);
    let plans = plan(&[], grid(4, 4), 0.0, &PlannerParams::default(), &mut rng);
    assert!(plans.is_empty());
}

#[test]
fn params_validation_rejects_bad_constants() {
    assert!(PlannerParams::default().validate().is_ok());
    let bad = PlannerParams {
        world_scale: 0.0,
        ..PlannerParams::default()
    };
    assert!(bad.validate().is_err());
    let bad = PlannerParams {
        flight_secs: f64::NAN,
        ..PlannerParams::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn params_deserialize_with_defaults() {
    let p: PlannerParams = serde_json::from_str(r#"{"world_scale": 10.0}"#).unwrap();
    assert_eq!(p.world_scale, 10.0);
    assert_eq!(p.sweep_cap, 1600.0);
    assert_eq!(p.drift, Some(SwarmDrift::default()));
}
