use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::assets::atlas::{AtlasBuilder, SequentialPicker};
use crate::assets::fonts::FontLibrary;
use crate::assets::raster::GlyphRasterizer;
use crate::choreo::camera::default_camera_presets;
use crate::choreo::remap::default_remap_presets;
use crate::choreo::stage::{DustParams, LetterSettings, ParticleLetters};
use crate::foundation::core::GridSize;

fn driver(seed: u64) -> CycleDriver<ParticleLetters> {
    let fonts = FontLibrary::empty();
    let stage = ParticleLetters::new(
        GlyphRasterizer::new(fonts.clone(), "sans-serif"),
        AtlasBuilder::new(fonts, "FontAwesome", 4),
        Box::new(SequentialPicker::default()),
        LetterSettings {
            canvas: GridSize { cols: 12, rows: 4 },
            font_size: 4.0,
            atlas_matrix: 2,
            dust: DustParams {
                count: 0,
                extent: 0.0,
            },
            ..LetterSettings::default()
        },
    )
    .unwrap();
    CycleDriver::new(
        stage,
        CycleSettings::default(),
        CameraDirector::new(default_camera_presets()).unwrap(),
        TimeRemapper::new(default_remap_presets()).unwrap(),
        Box::new(StdRng::seed_from_u64(seed)),
    )
    .unwrap()
}

fn hue_dist(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(1.0);
    d.min(1.0 - d)
}

/// Tick until `cycle_id` reaches `target`, with a hard cap on wall time.
fn run_until_cycle(d: &mut CycleDriver<ParticleLetters>, target: u64) {
    let mut ticks = 0;
    while d.state().cycle_id < target {
        d.tick(0.1).unwrap();
        ticks += 1;
        assert!(ticks < 10_000, "cycle {target} never started");
    }
}

#[test]
fn new_driver_is_idle() {
    let d = driver(1);
    assert_eq!(d.phase(), Phase::Idle);
    assert_eq!(d.state().cycle_id, 0);
    assert!((d.state().global_hue - 0.6).abs() < 1e-12);
    assert_eq!(d.world().pool.len(), 48);
    assert!(d.live_timeline().is_none());
}

#[test]
fn start_composes_the_first_cycle() {
    let mut d = driver(2);
    d.start().unwrap();
    let s = d.state().clone();
    assert_eq!(s.phase, Phase::Animating);
    assert_eq!(s.cycle_id, 1);
    assert_eq!(s.word_index, 0);
    assert_eq!(s.word, "WebGL");
    // No fonts: the mask is blank and every pixel is transparent.
    assert_eq!(s.active_particles, 48);
    assert!(s.camera.is_some() && s.remap.is_some());
    assert!((s.global_hue - 0.8).abs() < 1e-12);
    assert!((d.world().backdrop.h - 0.6).abs() < 1e-12);
    assert_eq!(d.world().pool.visible_count(), 0);
    assert_eq!(d.plans().len(), 48);
    assert!(d.live_timeline().unwrap().has_rate_overlay());
}

#[test]
fn start_is_refused_while_a_cycle_is_live() {
    let mut d = driver(3);
    d.start().unwrap();
    let before = d.state().clone();
    assert!(matches!(d.start(), Err(SwarmError::Schedule(_))));
    assert_eq!(d.state(), &before);
}

#[test]
fn cover_fades_in_then_out_around_each_cycle() {
    let mut d = driver(4);
    assert_eq!(d.world().cover_opacity, 1.0);
    d.start().unwrap();
    // Enough wall time for the fade even at the slowest initial rate.
    for _ in 0..20 {
        d.tick(0.1).unwrap();
    }
    assert_eq!(d.world().cover_opacity, 0.0);

    let mut ticks = 0;
    while d.phase() != Phase::Completing {
        d.tick(0.1).unwrap();
        ticks += 1;
        assert!(ticks < 10_000);
    }
    assert!(matches!(d.start(), Err(SwarmError::Schedule(_))));
    assert!(d.fade_timeline().is_some());
    assert!(d.live_timeline().is_none());

    while d.phase() == Phase::Completing {
        d.tick(0.1).unwrap();
    }
    assert_eq!(d.world().cover_opacity, 1.0);
    assert_eq!(d.state().cycle_id, 2);
}

#[test]
fn loop_advances_words_and_hues_and_never_leaks_particles() {
    let mut d = driver(5);
    d.start().unwrap();
    let words = CycleSettings::default().words;
    for k in 1..=5u64 {
        run_until_cycle(&mut d, k);
        let s = d.state();
        assert_eq!(s.phase, Phase::Animating);
        assert_eq!(s.word_index, ((k - 1) as usize) % words.len());
        assert_eq!(s.word, words[s.word_index]);
        let expected_hue = 0.6 + 0.2 * (k - 1) as f64;
        assert!(hue_dist(d.world().backdrop.h, expected_hue) < 1e-9);
        assert!((0.0..1.0).contains(&s.global_hue));
        // A fresh cycle starts with every slot hidden.
        assert_eq!(d.world().pool.visible_count(), 0);
    }
}

#[test]
fn stale_events_are_ignored() {
    let mut d = driver(6);
    d.start().unwrap();
    let old = d.live_timeline().unwrap().id();
    let stale = TimelineEvent {
        timeline: TimelineId(old.0 + 100),
        cue: Cue::Completed,
        at: 0.0,
    };
    assert!(!d.deliver(stale).unwrap());
    assert_eq!(d.phase(), Phase::Animating);

    d.cancel();
    let late = TimelineEvent {
        timeline: old,
        cue: Cue::Completed,
        at: 15.0,
    };
    assert!(!d.deliver(late).unwrap());
    assert_eq!(d.phase(), Phase::Idle);
}

#[test]
fn cancel_hides_everything_and_allows_a_restart() {
    let mut d = driver(7);
    d.start().unwrap();
    for _ in 0..100 {
        d.tick(0.1).unwrap();
    }
    d.cancel();
    assert_eq!(d.phase(), Phase::Idle);
    assert_eq!(d.world().pool.visible_count(), 0);
    assert!(d.live_timeline().is_none());
    assert!(d.plans().is_empty());

    // Ticking an idle driver is a no-op.
    d.tick(1.0).unwrap();
    assert_eq!(d.world().pool.visible_count(), 0);

    d.start().unwrap();
    assert_eq!(d.state().cycle_id, 2);
    assert_eq!(d.state().word, "HTML5");
}

#[test]
fn completion_event_of_the_live_timeline_moves_to_completing() {
    let mut d = driver(8);
    d.start().unwrap();
    let id = d.live_timeline().unwrap().id();
    let ev = TimelineEvent {
        timeline: id,
        cue: Cue::Completed,
        at: 15.0,
    };
    assert!(d.deliver(ev).unwrap());
    assert_eq!(d.phase(), Phase::Completing);
    // Delivering it again is stale: the live timeline is gone.
    assert!(!d.deliver(ev).unwrap());
}

#[test]
fn settings_validation() {
    let empty = CycleSettings {
        words: Vec::new(),
        ..CycleSettings::default()
    };
    assert!(empty.validate().is_err());
    let bad_fade = CycleSettings {
        fade_secs: -1.0,
        ..CycleSettings::default()
    };
    assert!(bad_fade.validate().is_err());
}
