use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 30.0).abs() < 1e-12);
    assert_eq!(fps.secs_to_frames_floor(2.0), 60);
}

#[test]
fn grid_size_rejects_empty_sides() {
    assert!(GridSize::new(0, 40).is_err());
    assert!(GridSize::new(160, 0).is_err());
    assert_eq!(GridSize::new(160, 40).unwrap().cells(), 6400);
}

#[test]
fn hsl_primaries() {
    let red = Hsl::new(0.0, 1.0, 0.5).to_rgb();
    assert!((red[0] - 1.0).abs() < 1e-9);
    assert!(red[1].abs() < 1e-9);
    assert!(red[2].abs() < 1e-9);

    let blue = Hsl::new(2.0 / 3.0, 1.0, 0.5).to_rgba8(1.0);
    assert_eq!(blue, [0, 0, 255, 255]);
}

#[test]
fn hsl_hue_wraps_outside_unit_range() {
    let a = Hsl::new(0.25, 0.5, 0.6).to_rgba8(1.0);
    let b = Hsl::new(1.25, 0.5, 0.6).to_rgba8(1.0);
    let c = Hsl::new(-0.75, 0.5, 0.6).to_rgba8(1.0);
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn grey_when_unsaturated() {
    assert_eq!(Hsl::new(0.3, 0.0, 0.5).to_rgba8(0.0), [128, 128, 128, 0]);
}
