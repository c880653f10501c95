use std::sync::OnceLock;

use super::*;

fn system_fonts() -> FontLibrary {
    static FONTS: OnceLock<FontLibrary> = OnceLock::new();
    FONTS.get_or_init(|| FontLibrary::load(&[])).clone()
}

#[test]
fn escape_xml_handles_markup_characters() {
    assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
    assert_eq!(escape_xml("HTML5"), "HTML5");
}

#[test]
fn label_svg_centers_and_hangs_the_text() {
    let svg = label_svg("A&B", "Source Code Pro", 600, 42.0, 250, 40);
    assert!(svg.contains(r#"width="250" height="40""#));
    assert!(svg.contains(r#"x="125" y="0""#));
    assert!(svg.contains(r#"text-anchor="middle""#));
    assert!(svg.contains(r#"dominant-baseline="hanging""#));
    assert!(svg.contains(">A&amp;B</text>"));
}

#[test]
fn empty_label_is_blank_and_skips_fonts() {
    let r = GlyphRasterizer::new(FontLibrary::empty(), "sans-serif");
    let h = r.rasterize("", 42.0, 25, 4).unwrap();
    assert_eq!(h.size(), GridSize { cols: 25, rows: 4 });
    let mask = h.alpha_mask().unwrap();
    assert_eq!(mask.opaque_count(), 0);
    assert_eq!(mask.transparent_count(), 100);
}

#[test]
fn zero_sized_surface_is_rejected() {
    let r = GlyphRasterizer::new(FontLibrary::empty(), "sans-serif");
    assert!(r.rasterize("HI", 42.0, 0, 40).is_err());
    assert!(r.rasterize("HI", 0.0, 10, 10).is_err());
}

#[test]
fn label_without_fonts_renders_nothing() {
    let r = GlyphRasterizer::new(FontLibrary::empty(), "sans-serif");
    let h = r.rasterize("HI", 36.0, 64, 40).unwrap();
    assert_eq!(h.alpha_mask().unwrap().opaque_count(), 0);
}

#[test]
fn label_with_system_fonts_lands_inside_the_canvas() {
    let fonts = system_fonts();
    if fonts.face_count() == 0 {
        return;
    }
    let r = GlyphRasterizer::new(fonts, "sans-serif");
    let h = r.rasterize("HI", 36.0, 160, 40).unwrap();
    let mask = h.alpha_mask().unwrap();
    assert!(mask.opaque_count() > 0);
    assert_eq!(mask.opaque_count() + mask.transparent_count(), 160 * 40);

    // Centered: ink exists on both halves and the outer columns stay clear.
    let ink_cols: Vec<u32> = mask.pixels().filter(|(_, o)| *o).map(|(p, _)| p.col).collect();
    let min = ink_cols.iter().copied().min().unwrap();
    let max = ink_cols.iter().copied().max().unwrap();
    assert!(min < 80 && max >= 80);
    assert!(min > 0 && max < 159);
}
