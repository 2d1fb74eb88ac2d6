// Glyph catalog and rasterizer backed by embedded-graphics mono fonts
use crate::application::text_rasterizer::TextRasterizer;
use crate::domain::bit_plane::{BitPlane, MARK};
use crate::domain::layout::{FontSpec, FontWeight, RenderError};
use crate::infrastructure::config::FontSettings;
use embedded_graphics::{
    mono_font::{
        iso_8859_1::{FONT_10X20, FONT_9X15, FONT_9X15_BOLD},
        MonoFont, MonoTextStyle,
    },
    prelude::*,
    primitives::Rectangle,
    text::{Baseline, Text},
};

/// Look up the face a family provides for a point size.
pub fn lookup(family: &str, size: u32) -> Option<&'static MonoFont<'static>> {
    match (family, size) {
        ("fixed", 15) => Some(&FONT_9X15),
        ("fixed", 30) => Some(&FONT_10X20),
        ("fixed-bold", 15) => Some(&FONT_9X15_BOLD),
        ("profont", 15) => Some(&profont::PROFONT_14_POINT),
        ("profont", 30) => Some(&profont::PROFONT_24_POINT),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct MonoFontRasterizer {
    regular: String,
    bold: String,
}

impl MonoFontRasterizer {
    pub fn new(settings: &FontSettings) -> Self {
        Self {
            regular: settings.regular.clone(),
            bold: settings.bold.clone(),
        }
    }

    fn family(&self, weight: FontWeight) -> &str {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    fn resolve(&self, font: FontSpec) -> Result<&'static MonoFont<'static>, RenderError> {
        let family = self.family(font.weight);
        lookup(family, font.size).ok_or_else(|| RenderError::FontNotFound {
            family: family.to_string(),
            size: font.size,
        })
    }
}

impl TextRasterizer for MonoFontRasterizer {
    fn draw_text(
        &self,
        plane: &mut BitPlane,
        text: &str,
        area: Rectangle,
        font: FontSpec,
    ) -> Result<(), RenderError> {
        let style = MonoTextStyle::new(self.resolve(font)?, MARK);
        // Infallible target
        let _ = Text::with_baseline(text, area.top_left, style, Baseline::Top)
            .draw(&mut plane.clipped(&area));
        Ok(())
    }

    fn ensure_fonts(&self, fonts: &[FontSpec]) -> Result<(), RenderError> {
        fonts.iter().try_for_each(|font| self.resolve(*font).map(|_| ()))
    }
}
