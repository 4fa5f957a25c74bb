use std::path::{Path, PathBuf};

use eframe::egui::{self, FontData, FontDefinitions, FontFamily};
use fontdb::{Database, Family, Query};
use log::{info, warn};

use crate::config::FontConfig;

// ---------------------------------------------------------------------------
// Font faces and catalogs
// ---------------------------------------------------------------------------

/// Raw font file contents plus the face to use inside a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    pub family: String,
    pub data: Vec<u8>,
    pub index: u32,
}

/// Fonts installed on the host.
pub trait FontCatalog {
    /// Every installed family name (duplicates allowed).
    fn families(&self) -> Vec<String>;
    /// Font data for `family`, if it can actually be read.
    fn face(&self, family: &str) -> Option<FontFace>;
}

/// [`FontCatalog`] backed by the system font directories.
pub struct SystemFonts {
    db: Database,
}

impl SystemFonts {
    pub fn load() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("Found {} installed font faces", db.len());
        Self { db }
    }
}

impl FontCatalog for SystemFonts {
    fn families(&self) -> Vec<String> {
        self.db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    fn face(&self, family: &str) -> Option<FontFace> {
        let id = self.db.query(&Query {
            families: &[Family::Name(family)],
            ..Query::default()
        })?;
        self.db.with_face_data(id, |data, index| FontFace {
            family: family.to_owned(),
            data: data.to_vec(),
            index,
        })
    }
}

// ---------------------------------------------------------------------------
// Render context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSource {
    Bundled,
    System,
    Fallback,
}

impl FontSource {
    pub fn as_str(self) -> &'static str {
        match self {
            FontSource::Bundled => "bundled",
            FontSource::System => "system",
            FontSource::Fallback => "fallback",
        }
    }
}

/// Rendering settings handed to the charting code. Nothing here touches
/// egui until [`install`](Self::install) is called.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub source: FontSource,
    /// `None` in fallback mode: egui's built-in fonts stay in place.
    pub face: Option<FontFace>,
    /// Render negative numbers with U+2212 instead of `-`. Hangul fonts
    /// often lack that glyph.
    pub unicode_minus: bool,
}

impl RenderContext {
    pub fn fallback() -> Self {
        Self {
            source: FontSource::Fallback,
            face: None,
            unicode_minus: false,
        }
    }

    /// `bundled:<family>`, `system:<family>` or `fallback`.
    pub fn identifier(&self) -> String {
        match &self.face {
            Some(face) => format!("{}:{}", self.source.as_str(), face.family),
            None => self.source.as_str().to_owned(),
        }
    }

    /// egui font definitions with the chosen face first in both families.
    pub fn font_definitions(&self) -> FontDefinitions {
        let mut fonts = FontDefinitions::default();
        if let Some(face) = &self.face {
            let mut data = FontData::from_owned(face.data.clone());
            data.index = face.index;
            fonts.font_data.insert(face.family.clone(), data.into());
            for family in [FontFamily::Proportional, FontFamily::Monospace] {
                fonts
                    .families
                    .entry(family)
                    .or_default()
                    .insert(0, face.family.clone());
            }
        }
        fonts
    }

    pub fn install(&self, ctx: &egui::Context) {
        if self.face.is_some() {
            ctx.set_fonts(self.font_definitions());
        }
    }

    pub fn number_format(&self) -> NumberFormat {
        NumberFormat {
            unicode_minus: self.unicode_minus,
        }
    }

    pub fn format_number(&self, value: f64, decimals: usize) -> String {
        self.number_format().format(value, decimals)
    }
}

/// The part of [`RenderContext`] that axis formatters need; cheap to move
/// into `'static` closures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub unicode_minus: bool,
}

impl NumberFormat {
    /// Fixed-point number honoring `unicode_minus`.
    pub fn format(self, value: f64, decimals: usize) -> String {
        let text = format!("{value:.decimals$}");
        if self.unicode_minus {
            text.replacen('-', "\u{2212}", 1)
        } else {
            text
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Picks a font able to render Hangul: bundled files, then installed
/// families, then egui's defaults.
#[derive(Debug, Clone)]
pub struct FontResolver {
    bundled: Vec<PathBuf>,
    preferences: Vec<String>,
}

impl FontResolver {
    pub fn new(config: &FontConfig) -> Self {
        Self {
            bundled: config.bundled.clone(),
            preferences: config.system_preferences.clone(),
        }
    }

    /// Never fails; the worst case is [`RenderContext::fallback`].
    pub fn resolve(&self, catalog: &dyn FontCatalog) -> RenderContext {
        let context = self
            .bundled_face()
            .map(|face| (FontSource::Bundled, face))
            .or_else(|| self.system_face(catalog).map(|face| (FontSource::System, face)))
            .map(|(source, face)| RenderContext {
                source,
                face: Some(face),
                unicode_minus: false,
            })
            .unwrap_or_else(RenderContext::fallback);

        match context.source {
            FontSource::Fallback => {
                warn!("No Hangul font found; Korean text may render as boxes")
            }
            _ => info!("Using font {}", context.identifier()),
        }
        context
    }

    fn bundled_face(&self) -> Option<FontFace> {
        self.bundled.iter().find_map(|path| {
            if !path.is_file() {
                return None;
            }
            let data = match std::fs::read(path) {
                Ok(data) => data,
                Err(e) => {
                    warn!("Cannot read bundled font {}: {e}", path.display());
                    return None;
                }
            };
            let face = parse_face(data, path);
            if face.is_none() {
                warn!("Skipping bundled font {}: not a valid font file", path.display());
            }
            face
        })
    }

    fn system_face(&self, catalog: &dyn FontCatalog) -> Option<FontFace> {
        let installed = catalog.families();
        self.preferences
            .iter()
            .filter(|wanted| installed.iter().any(|name| name == *wanted))
            .find_map(|wanted| catalog.face(wanted))
    }
}

/// First face fontdb can parse from `data`, with its family taken from the
/// name table (or the file stem when the table has none). `None` when the
/// bytes are not a font egui could load.
fn parse_face(data: Vec<u8>, path: &Path) -> Option<FontFace> {
    let mut db = Database::new();
    db.load_font_data(data);
    let parsed = db.faces().next().map(|face| {
        let family = face.families.first().map(|(name, _)| name.clone());
        (face.id, face.index, family)
    });
    let (id, index, family) = parsed?;
    let family = family
        .or_else(|| path.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
        .unwrap_or_else(|| "bundled".to_owned());
    db.with_face_data(id, |data, _| FontFace {
        family,
        data: data.to_vec(),
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCatalog {
        installed: Vec<&'static str>,
    }

    impl FontCatalog for FakeCatalog {
        fn families(&self) -> Vec<String> {
            self.installed.iter().map(|s| s.to_string()).collect()
        }

        fn face(&self, family: &str) -> Option<FontFace> {
            self.installed.iter().any(|f| *f == family).then(|| FontFace {
                family: family.to_owned(),
                data: real_font_bytes(),
                index: 0,
            })
        }
    }

    /// A font egui itself ships, so installing it is known to work.
    fn real_font_bytes() -> Vec<u8> {
        FontDefinitions::default()
            .font_data
            .values()
            .next()
            .unwrap()
            .font
            .to_vec()
    }

    fn resolver(bundled: Vec<PathBuf>, prefs: &[&str]) -> FontResolver {
        FontResolver::new(&FontConfig {
            bundled,
            system_preferences: prefs.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn temp_font(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("survey-lens-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Install the context and lay out one frame of Hangul text.
    fn render_one_frame(render: &RenderContext) {
        let ctx = egui::Context::default();
        render.install(&ctx);
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.label("업무만족도 분석 대시보드");
                ui.label(render.format_number(-1.5, 2));
            });
        });
    }

    #[test]
    fn bundled_file_wins_over_system_fonts() {
        let path = temp_font("Bundled.ttf", &real_font_bytes());

        let ctx = resolver(
            vec![PathBuf::from("/nonexistent/a.ttf"), path.clone()],
            &["Malgun Gothic"],
        )
        .resolve(&FakeCatalog {
            installed: vec!["Malgun Gothic"],
        });

        assert_eq!(ctx.source, FontSource::Bundled);
        // family comes from the name table, not the file name
        let family = &ctx.face.as_ref().unwrap().family;
        assert!(!family.is_empty());
        assert!(!family.contains("Bundled"));
        assert_eq!(ctx.identifier(), format!("bundled:{family}"));
        assert!(!ctx.unicode_minus);
        render_one_frame(&ctx);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unparsable_bundled_file_is_skipped() {
        let junk = temp_font("Junk.ttf", b"not really a font");
        let font = temp_font("Second.ttf", &real_font_bytes());

        let ctx = resolver(vec![junk.clone()], &["NanumGothic"]).resolve(&FakeCatalog {
            installed: vec!["NanumGothic"],
        });
        assert_eq!(ctx.identifier(), "system:NanumGothic");
        render_one_frame(&ctx);

        let ctx = resolver(vec![junk.clone(), font.clone()], &[]).resolve(&FakeCatalog {
            installed: vec![],
        });
        assert_eq!(ctx.source, FontSource::Bundled);
        render_one_frame(&ctx);

        let ctx = resolver(vec![junk.clone()], &[]).resolve(&FakeCatalog {
            installed: vec![],
        });
        assert_eq!(ctx.identifier(), "fallback");
        render_one_frame(&ctx);

        std::fs::remove_file(&junk).unwrap();
        std::fs::remove_file(&font).unwrap();
    }

    #[test]
    fn first_installed_preference_is_chosen() {
        let ctx = resolver(vec![], &["Malgun Gothic", "AppleGothic", "NanumGothic"]).resolve(
            &FakeCatalog {
                installed: vec!["DejaVu Sans", "NanumGothic", "AppleGothic"],
            },
        );
        assert_eq!(ctx.source, FontSource::System);
        assert_eq!(ctx.identifier(), "system:AppleGothic");
        render_one_frame(&ctx);
    }

    #[test]
    fn nothing_available_falls_back() {
        let ctx = resolver(vec![PathBuf::from("/nonexistent/font.ttf")], &["Malgun Gothic"])
            .resolve(&FakeCatalog {
                installed: vec!["DejaVu Sans"],
            });
        assert_eq!(ctx.source, FontSource::Fallback);
        assert_eq!(ctx.identifier(), "fallback");
        assert!(ctx.face.is_none());
        assert!(!ctx.unicode_minus);
        render_one_frame(&ctx);
    }

    #[test]
    fn chosen_face_leads_both_families() {
        let ctx = resolver(vec![], &["NanumGothic"]).resolve(&FakeCatalog {
            installed: vec!["NanumGothic"],
        });
        let fonts = ctx.font_definitions();
        assert!(fonts.font_data.contains_key("NanumGothic"));
        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            assert_eq!(fonts.families[&family][0], "NanumGothic");
        }
    }

    #[test]
    fn fallback_leaves_default_fonts() {
        let fonts = RenderContext::fallback().font_definitions();
        assert!(!fonts.font_data.contains_key("NanumGothic"));
        assert_eq!(
            fonts.families[&FontFamily::Proportional],
            FontDefinitions::default().families[&FontFamily::Proportional]
        );
    }

    #[test]
    fn minus_sign_follows_flag() {
        let mut ctx = RenderContext::fallback();
        assert_eq!(ctx.format_number(-1.5, 2), "-1.50");
        ctx.unicode_minus = true;
        assert_eq!(ctx.format_number(-1.5, 2), "\u{2212}1.50");
    }
}
