use super::*;
use crate::choreo::cycle::Phase;

#[test]
fn empty_json_yields_defaults() {
    let cfg = ShowConfig::from_json("{}").unwrap();
    assert_eq!(cfg, ShowConfig::default());
    assert_eq!(cfg.cycle.words, vec!["WebGL", "HTML5", "THREE"]);
    assert_eq!(cfg.fonts.label_family, "Source Code Pro");
    assert_eq!(cfg.atlas.family, "FontAwesome");
    assert_eq!(cfg.camera_presets.len(), 3);
    assert_eq!(cfg.remap_presets.len(), 3);
}

#[test]
fn partial_sections_keep_their_other_defaults() {
    let cfg = ShowConfig::from_json(
        r#"{
            "cycle": { "words": ["HI"] },
            "letters": { "canvas": { "cols": 160, "rows": 40 }, "font_size": 36 },
            "atlas": { "picker": { "kind": "weighted", "glyphs": [[61570, 2.0], [61594, 1.0]] } },
            "output": { "preview": { "width": 320, "height": 180 } }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.cycle.words, vec!["HI"]);
    assert_eq!(cfg.cycle.hue_step, 0.2);
    assert_eq!(cfg.letters.canvas.cols, 160);
    assert_eq!(cfg.letters.font_size, 36.0);
    assert_eq!(cfg.letters.atlas_matrix, 8);
    assert_eq!(
        cfg.atlas.picker,
        PickerConfig::Weighted {
            glyphs: vec![(61570, 2.0), (61594, 1.0)]
        }
    );
    assert_eq!(cfg.output.preview.width, 320);
    assert_eq!(cfg.output.preview.particle_size, 40.0);
}

#[test]
fn invalid_configs_are_rejected() {
    assert!(matches!(
        ShowConfig::from_json(r#"{ "cycle": { "words": [] } }"#),
        Err(SwarmError::Validation(_))
    ));
    assert!(matches!(
        ShowConfig::from_json(r#"{ "camera_presets": [] }"#),
        Err(SwarmError::Validation(_))
    ));
    assert!(matches!(
        ShowConfig::from_json(r#"{ "output": { "fps": { "num": 0, "den": 1 } } }"#),
        Err(SwarmError::Validation(_))
    ));
    assert!(matches!(
        ShowConfig::from_json(r#"{ "atlas": { "cell_px": 0 } }"#),
        Err(SwarmError::Validation(_))
    ));
    assert!(matches!(
        ShowConfig::from_json("{ not json"),
        Err(SwarmError::Serde(_))
    ));
}

#[test]
fn missing_file_reports_the_path() {
    let err = ShowConfig::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"), "{err}");
}

#[test]
fn icon_picker_uses_the_stock_glyphs() {
    let PickerConfig::Weighted { glyphs } = PickerConfig::icons() else {
        panic!("icons should be weighted");
    };
    assert_eq!(glyphs.len(), DEFAULT_ICON_GLYPHS.len());
}

#[test]
fn driver_builds_idle_without_fonts() {
    let mut cfg = ShowConfig::default();
    cfg.letters.canvas.cols = 20;
    cfg.letters.canvas.rows = 6;
    cfg.letters.atlas_matrix = 2;
    cfg.letters.dust.count = 10;
    let driver = cfg
        .build_driver(FontLibrary::empty(), Box::new(StdRng::seed_from_u64(3)))
        .unwrap();
    assert_eq!(driver.phase(), Phase::Idle);
    assert_eq!(driver.world().pool.len(), 120);
    assert_eq!(driver.world().dust.len(), 10);
    assert_eq!(driver.stage().atlas().map(|a| a.matrix_len()), Some(2));
}
