use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::foundation::core::{GridSize, SlotId};

fn world() -> World {
    let mut rng = StdRng::seed_from_u64(1);
    let pool = ParticlePool::build(GridSize { cols: 4, rows: 2 }, 2, &mut rng).unwrap();
    World::new(pool, 2)
}

#[test]
fn new_world_starts_covered_with_default_camera() {
    let w = world();
    assert_eq!(w.cover_opacity, 1.0);
    assert_eq!(w.camera.position, Vec3::new(0.0, 0.0, 5000.0));
    assert_eq!(w.camera.fov_deg, 45.0);
    assert_eq!(w.glyph_weights, vec![1.0; 4]);
    assert_eq!(w.pool.visible_count(), 0);
}

#[test]
fn particle_channels_round_trip_through_the_stage() {
    let mut w = world();
    let id = SlotId(3);
    w.write(Channel::ParticlePosition(id), Value::Vec3(Vec3::new(1.0, 2.0, 3.0)));
    w.write(Channel::ParticleRotationZ(id), Value::Scalar(0.5));
    w.write(Channel::ParticleVisible(id), Value::Flag(true));
    assert_eq!(
        w.read(Channel::ParticlePosition(id)),
        Some(Value::Vec3(Vec3::new(1.0, 2.0, 3.0)))
    );
    assert_eq!(w.read(Channel::ParticleRotationZ(id)), Some(Value::Scalar(0.5)));
    assert_eq!(w.pool.visible_count(), 1);
    assert_eq!(w.read(Channel::ParticleVisible(SlotId(99))), None);
}

#[test]
fn mistyped_and_out_of_range_writes_are_ignored() {
    let mut w = world();
    w.write(Channel::CameraFov, Value::Flag(true));
    assert_eq!(w.camera.fov_deg, 45.0);
    w.write(Channel::ParticleVisible(SlotId(99)), Value::Flag(true));
    assert_eq!(w.pool.visible_count(), 0);
}

#[test]
fn cover_opacity_is_clamped() {
    let mut w = world();
    w.write(Channel::CoverOpacity, Value::Scalar(1.7));
    assert_eq!(w.cover_opacity, 1.0);
    w.write(Channel::CoverOpacity, Value::Scalar(-0.2));
    assert_eq!(w.cover_opacity, 0.0);
}

#[test]
fn glyph_coverage_is_normalized_to_the_brightest_cell() {
    let mut w = world();
    w.set_glyph_coverage(vec![0.1, 0.2, 0.4, 0.0]);
    assert_eq!(w.glyph_weight(0, 1), 1.0);
    assert_eq!(w.glyph_weight(1, 0), 0.5);
    assert_eq!(w.glyph_weight(1, 1), 0.0);
    // Blank atlas keeps the previous weights.
    w.set_glyph_coverage(vec![0.0; 4]);
    assert_eq!(w.glyph_weight(1, 0), 0.5);
}

#[test]
fn dust_stays_inside_its_cube() {
    let mut w = world();
    let mut rng = StdRng::seed_from_u64(2);
    w.scatter_dust(500, 100.0, &mut rng);
    assert_eq!(w.dust.len(), 500);
    assert!(w.dust.iter().all(|p| p.abs().max_element() <= 50.0));
}

#[test]
fn attaching_an_atlas_weights_cells_by_ink() {
    // 2x2 atlas of 2 px cells: cell (0, 0) fully inked, cell (1, 1) half inked.
    let mut data = vec![0u8; 4 * 4 * 4];
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2)] {
        data[(y * 4 + x) * 4 + 3] = 255;
    }
    let frame = crate::render::frame::FrameRGBA::from_premul(4, 4, data).unwrap();
    let atlas = Arc::new(Atlas::from_frame(2, 2, frame));

    let mut w = world();
    w.attach_atlas(Arc::clone(&atlas));
    assert!(Arc::ptr_eq(w.atlas.as_ref().unwrap(), &atlas));
    assert_eq!(w.glyph_weight(0, 0), 1.0);
    assert_eq!(w.glyph_weight(1, 0), 0.0);
    assert_eq!(w.glyph_weight(1, 1), 0.5);
}
