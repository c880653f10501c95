use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;

#[test]
fn sequential_picker_counts_up_from_first() {
    let mut p = SequentialPicker::default();
    assert_eq!(p.pick(0), '\u{F122}');
    assert_eq!(p.pick(5), '\u{F127}');
    // Surrogates are not chars.
    assert_eq!(SequentialPicker::new(0xD7FF).pick(1), char::REPLACEMENT_CHARACTER);
}

#[test]
fn weighted_picker_only_returns_listed_glyphs() {
    let mut p = WeightedPicker::icons(StdRng::seed_from_u64(2)).unwrap();
    for i in 0..200 {
        let c = p.pick(i) as u32;
        assert!(DEFAULT_ICON_GLYPHS.contains(&c));
    }
}

#[test]
fn weighted_picker_rejects_invalid_code_points() {
    let rng = StdRng::seed_from_u64(2);
    assert!(WeightedPicker::new(&[(0xD800, 1.0)], rng.clone()).is_err());
    assert!(WeightedPicker::new(&[], rng).is_err());
}

#[test]
fn build_lays_cells_out_row_major() {
    let b = AtlasBuilder::new(FontLibrary::empty(), "FontAwesome", 16);
    let atlas = b.build(4, &mut SequentialPicker::new(0x41)).unwrap();
    assert_eq!(atlas.matrix_len(), 4);
    assert_eq!(atlas.frame().width, 64);
    assert_eq!(atlas.frame().height, 64);
    assert_eq!(atlas.glyph(AtlasCell { col: 0, row: 0 }), Some('A'));
    assert_eq!(atlas.glyph(AtlasCell { col: 1, row: 0 }), Some('B'));
    assert_eq!(atlas.glyph(AtlasCell { col: 0, row: 1 }), Some('E'));
    assert_eq!(atlas.glyph(AtlasCell { col: 4, row: 0 }), None);
}

#[test]
fn uv_region_is_offset_plus_unit_square() {
    let b = AtlasBuilder::new(FontLibrary::empty(), "FontAwesome", 8);
    let atlas = b.build(8, &mut SequentialPicker::default()).unwrap();
    let r = atlas.uv_region(AtlasCell { col: 2, row: 7 });
    assert_eq!(r.x0, 0.25);
    assert_eq!(r.y0, 0.875);
    assert_eq!(r.width(), 0.125);
    assert_eq!(r.height(), 0.125);
}

#[test]
fn empty_font_library_yields_transparent_cells() {
    let b = AtlasBuilder::new(FontLibrary::empty(), "FontAwesome", 8);
    let atlas = b.build(2, &mut SequentialPicker::new(0x41)).unwrap();
    assert_eq!(atlas.coverage(AtlasCell { col: 1, row: 1 }), 0.0);
    assert_eq!(atlas.coverage(AtlasCell { col: 9, row: 1 }), 0.0);
}

#[test]
fn invalid_layouts_are_rejected() {
    let b = AtlasBuilder::new(FontLibrary::empty(), "FontAwesome", 8);
    assert!(b.build(0, &mut SequentialPicker::default()).is_err());
    let huge = AtlasBuilder::new(FontLibrary::empty(), "FontAwesome", 4096);
    assert!(huge.build(8, &mut SequentialPicker::default()).is_err());
    let flat = AtlasBuilder::new(FontLibrary::empty(), "FontAwesome", 8).with_glyph_scale(0.0);
    assert!(flat.build(2, &mut SequentialPicker::default()).is_err());
}
