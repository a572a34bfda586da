use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};
use typst_library::foundations::Bytes;
use typst_library::text::{Font, FontWeight};

use super::render::{compile_page, text_call, text_defaults};
use super::text::{TextMeasure, TextStyle};
use crate::config::CardConfig;
use crate::error::{Error, Result};

/// The fonts a card is measured and rasterized with.
///
/// Layout measures through this book and the renderer hands the same `Font`
/// values to Typst. Widths come from laying the run out with Typst itself, so
/// kerning and fallback glyphs count exactly as they are drawn.
#[derive(Clone)]
pub struct FontBook {
    family: String,
    fonts: Vec<Font>,
    widths: Arc<Mutex<HashMap<WidthKey, f64>>>,
}

type WidthKey = (String, u64, bool);

impl FontBook {
    /// Fonts bundled with Typst only.
    pub fn embedded(family: &str) -> Result<Self> {
        Self::with_fonts(family, embedded_fonts())
    }

    /// Bundled fonts plus every file listed in the card config.
    pub fn from_config(config: &CardConfig) -> Result<Self> {
        let mut fonts = embedded_fonts();
        for path in &config.font_files {
            fonts.extend(load_font_file(path)?);
        }
        Self::with_fonts(&config.font_family, fonts)
    }

    fn with_fonts(family: &str, fonts: Vec<Font>) -> Result<Self> {
        let has_family = fonts
            .iter()
            .any(|font| font.info().family.eq_ignore_ascii_case(family));
        if !has_family {
            return Err(Error::FontMissing(family.to_string()));
        }
        debug!(family, count = fonts.len(), "loaded card fonts");
        Ok(Self {
            family: family.to_string(),
            fonts,
            widths: Arc::default(),
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    /// Face of the card family closest to the requested weight.
    fn primary(&self, bold: bool) -> Option<&Font> {
        let target = if bold { FontWeight::BOLD } else { FontWeight::REGULAR };
        self.fonts
            .iter()
            .filter(|font| font.info().family.eq_ignore_ascii_case(&self.family))
            .min_by_key(|font| font.info().variant.weight.distance(target))
    }

    fn typeset_width(&self, text: &str, style: TextStyle) -> Result<f64> {
        let markup = format!(
            "#set page(width: auto, height: auto, margin: 0pt)\n{}\n#{}\n",
            text_defaults(&self.family),
            text_call(text, style, None)
        );
        let doc = compile_page(markup, self, Vec::new())?;
        let page = doc
            .pages
            .first()
            .ok_or_else(|| Error::Compile("measurement produced no page".to_string()))?;
        Ok(page.frame.size().x.to_pt())
    }

    /// Sum of nominal advances. Uncovered characters take the `.notdef`
    /// advance of the primary face, as Typst draws them.
    fn advance_width(&self, text: &str, style: TextStyle) -> f64 {
        let primary = self.primary(style.bold);
        let notdef = primary
            .and_then(|font| font.x_advance(0))
            .map(|em| em.get())
            .unwrap_or(0.0);
        let ems: f64 = text
            .chars()
            .map(|c| {
                primary
                    .into_iter()
                    .chain(self.fonts.iter())
                    .find_map(|font| {
                        let glyph = font.ttf().glyph_index(c)?;
                        font.x_advance(glyph.0)
                    })
                    .map(|em| em.get())
                    .unwrap_or(notdef)
            })
            .sum();
        ems * style.size
    }
}

impl TextMeasure for FontBook {
    fn width(&self, text: &str, style: TextStyle) -> f64 {
        if text.is_empty() {
            return 0.0;
        }
        let key = (text.to_string(), style.size.to_bits(), style.bold);
        if let Some(width) = self.widths.lock().get(&key) {
            return *width;
        }

        let width = match self.typeset_width(text, style) {
            Ok(width) => width,
            Err(err) => {
                warn!(%err, text, "typeset measurement failed, using glyph advances");
                self.advance_width(text, style)
            }
        };
        self.widths.lock().insert(key, width);
        width
    }
}

fn embedded_fonts() -> Vec<Font> {
    typst_assets::fonts()
        .flat_map(|data| Font::iter(Bytes::new(data)))
        .collect()
}

fn load_font_file(path: &Path) -> Result<Vec<Font>> {
    let data = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fonts: Vec<Font> = Font::iter(Bytes::new(data)).collect();
    debug!(path = %path.display(), faces = fonts.len(), "loaded font file");
    Ok(fonts)
}
