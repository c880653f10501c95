use std::path::{Path, PathBuf};
use std::sync::Arc;

use usvg::fontdb;

/// Shared font database handed to every SVG text render.
///
/// Holds the system fonts plus any `.ttf`/`.otf`/`.ttc` found directly inside the configured
/// directories. Cloning is cheap.
#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<fontdb::Database>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl FontLibrary {
    /// System fonts plus every font file inside `dirs`.
    #[tracing::instrument(skip_all, fields(dirs = dirs.len()))]
    pub fn load(dirs: &[PathBuf]) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for dir in dirs {
            load_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font database ready");
        Self { db: Arc::new(db) }
    }

    /// Library without any faces. Text renders to nothing.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    /// Number of loaded faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub(crate) fn usvg_options(&self) -> usvg::Options<'static> {
        usvg::Options {
            fontdb: Arc::clone(&self.db),
            font_resolver: resolver(),
            ..Default::default()
        }
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
        .unwrap_or(false)
}

fn load_dir(db: &mut fontdb::Database, dir: &Path) {
    if dir.is_file() && is_font_file(dir) {
        if let Err(e) = db.load_font_file(dir) {
            tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable font");
        }
        return;
    }
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "font dir not readable");
        return;
    };
    for path in rd.flatten().map(|e| e.path()) {
        if path.is_file()
            && is_font_file(&path)
            && let Err(e) = db.load_font_file(&path)
        {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

fn family(f: &usvg::FontFamily) -> fontdb::Family<'_> {
    match f {
        usvg::FontFamily::Serif => fontdb::Family::Serif,
        usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
        usvg::FontFamily::Cursive => fontdb::Family::Cursive,
        usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
        usvg::FontFamily::Monospace => fontdb::Family::Monospace,
        usvg::FontFamily::Named(s) => fontdb::Family::Name(s),
    }
}

fn stretch(s: usvg::FontStretch) -> fontdb::Stretch {
    use usvg::FontStretch as S;
    match s {
        S::UltraCondensed => fontdb::Stretch::UltraCondensed,
        S::ExtraCondensed => fontdb::Stretch::ExtraCondensed,
        S::Condensed => fontdb::Stretch::Condensed,
        S::SemiCondensed => fontdb::Stretch::SemiCondensed,
        S::Normal => fontdb::Stretch::Normal,
        S::SemiExpanded => fontdb::Stretch::SemiExpanded,
        S::Expanded => fontdb::Stretch::Expanded,
        S::ExtraExpanded => fontdb::Stretch::ExtraExpanded,
        S::UltraExpanded => fontdb::Stretch::UltraExpanded,
    }
}

fn style(s: usvg::FontStyle) -> fontdb::Style {
    match s {
        usvg::FontStyle::Normal => fontdb::Style::Normal,
        usvg::FontStyle::Italic => fontdb::Style::Italic,
        usvg::FontStyle::Oblique => fontdb::Style::Oblique,
    }
}

/// Requested families first, then the generic sans/serif/mono chain, then any face at all, so a
/// label still rasterizes on machines without the configured font.
fn resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let mut families: Vec<fontdb::Family<'_>> =
                font.families().iter().map(family).collect();
            families.extend([
                fontdb::Family::SansSerif,
                fontdb::Family::Serif,
                fontdb::Family::Monospace,
            ]);
            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: stretch(font.stretch()),
                style: style(font.style()),
            };
            db.query(&query).or_else(|| db.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
