use super::*;

#[test]
fn empty_library_has_no_faces() {
    assert_eq!(FontLibrary::empty().face_count(), 0);
}

#[test]
fn font_extensions_are_case_insensitive() {
    assert!(is_font_file(Path::new("a/b/Inter.TTF")));
    assert!(is_font_file(Path::new("x.otf")));
    assert!(is_font_file(Path::new("x.ttc")));
    assert!(!is_font_file(Path::new("x.woff2")));
    assert!(!is_font_file(Path::new("fonts")));
}

#[test]
fn missing_and_non_font_dirs_are_skipped() {
    let dir = std::env::temp_dir().join(format!("glyphswarm_fonts_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("readme.txt"), b"not a font").unwrap();

    let mut db = fontdb::Database::new();
    load_dir(&mut db, &dir);
    load_dir(&mut db, &dir.join("does-not-exist"));
    assert_eq!(db.len(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn options_share_the_database() {
    let lib = FontLibrary::empty();
    let opts = lib.usvg_options();
    assert_eq!(opts.fontdb.len(), 0);
}
