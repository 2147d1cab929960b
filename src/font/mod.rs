//! # Glyph Metrics
//!
//! The boundary between layout and fonts. Layout asks a
//! [`GlyphMetricsProvider`] for the metrics of one codepoint at a time and
//! never looks inside font files itself.
//!
//! Two providers ship with the crate: [`FixedFont`], a synthetic monospaced
//! font with exact, predictable metrics, and [`ttf::TtfFont`], backed by a
//! TrueType/OpenType file parsed with ttf-parser.

pub mod ttf;

pub use ttf::TtfFont;

use crate::geometry::{Rect, Vec2};
use crate::render::{AtlasSlot, TextureId, TextureManager};
use std::collections::HashMap;

/// Metrics of a single glyph, in the font's pixel unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMetrics {
    pub codepoint: u32,
    /// Horizontal pen advance, without kerning.
    pub advance: f32,
    /// Top-left of the rendered bitmap relative to the pen on the baseline.
    /// Negative `y` is above the baseline.
    pub offset: Vec2,
    /// Rendered bitmap size.
    pub size: Vec2,
    /// Atlas location, when the glyph has been rasterized.
    pub atlas: Option<AtlasSlot>,
}

impl GlyphMetrics {
    /// Zero-area glyphs (spaces) advance the pen but draw nothing.
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// The rendered rectangle relative to the pen on the baseline.
    pub fn render_rect(&self) -> Rect {
        Rect::new(self.offset.x, self.offset.y, self.size.x, self.size.y)
    }
}

/// A source of glyph metrics: one font at one size.
///
/// Lookups must be deterministic for a given codepoint within a layout pass.
/// Caching rasterized or parsed glyphs is the provider's business.
pub trait GlyphMetricsProvider {
    /// Metrics for `codepoint`, or `None` when the font cannot represent it
    /// (control characters, missing glyphs). `textures` is present when the
    /// glyph is requested for drawing.
    fn glyph(&self, textures: Option<&dyn TextureManager>, codepoint: u32)
        -> Option<GlyphMetrics>;

    /// Pair adjustment added to the advance of `left` when `right` follows.
    /// Fonts without pair tables return zero.
    fn kerning(&self, _left: u32, _right: u32) -> f32 {
        0.0
    }

    fn font_size(&self) -> f32;

    /// Distance between consecutive baselines.
    fn line_height(&self) -> f32;

    /// Distance from the top of a line to its baseline.
    fn ascent(&self) -> f32;

    /// Ratio between the size glyphs are rasterized at and the size they are
    /// displayed at. Draw and measure calls divide their scale by it.
    fn render_multiplier(&self) -> f32 {
        1.0
    }
}

const ATLAS_COLUMNS: u32 = 16;

/// A synthetic monospaced font.
///
/// Every printable codepoint advances by the same width and renders as a
/// box from the ascent line down to the baseline. Whitespace is an empty
/// glyph and control characters, isolated surrogates and noncharacters have
/// no glyph at all. Per-codepoint advances and kerning pairs can be
/// overridden, which makes it the reference font for tests and the CLI.
#[derive(Debug, Clone)]
pub struct FixedFont {
    font_size: f32,
    advance: f32,
    line_height: f32,
    ascent: f32,
    advances: HashMap<u32, f32>,
    kerning: HashMap<(u32, u32), f32>,
    texture: Option<TextureId>,
}

impl FixedFont {
    /// A font whose glyphs advance by `advance` and whose lines are
    /// `line_height` apart. The ascent defaults to 80% of the line height.
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            font_size: line_height,
            advance,
            line_height,
            ascent: (line_height * 0.8).round(),
            advances: HashMap::new(),
            kerning: HashMap::new(),
            texture: None,
        }
    }

    pub fn with_ascent(mut self, ascent: f32) -> Self {
        self.ascent = ascent;
        self
    }

    pub fn with_font_size(mut self, font_size: f32) -> Self {
        self.font_size = font_size;
        self
    }

    /// Override the advance of one character.
    pub fn with_advance(mut self, ch: char, advance: f32) -> Self {
        self.advances.insert(ch as u32, advance);
        self
    }

    /// Add a kerning pair.
    pub fn with_kerning(mut self, left: char, right: char, adjust: f32) -> Self {
        self.kerning.insert((left as u32, right as u32), adjust);
        self
    }

    /// Give drawable glyphs atlas slots in `texture`, laid out on a grid.
    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    fn has_glyph(codepoint: u32) -> bool {
        match char::from_u32(codepoint) {
            Some(ch) => !ch.is_control() && !matches!(codepoint, 0xFFFE | 0xFFFF),
            None => false,
        }
    }
}

impl GlyphMetricsProvider for FixedFont {
    fn glyph(
        &self,
        _textures: Option<&dyn TextureManager>,
        codepoint: u32,
    ) -> Option<GlyphMetrics> {
        if !Self::has_glyph(codepoint) {
            return None;
        }

        let advance = self
            .advances
            .get(&codepoint)
            .copied()
            .unwrap_or(self.advance);

        if crate::text::codepoint::is_whitespace(codepoint) {
            return Some(GlyphMetrics {
                codepoint,
                advance,
                offset: Vec2::ZERO,
                size: Vec2::ZERO,
                atlas: None,
            });
        }

        let size = Vec2::new(advance, self.ascent);
        let atlas = self.texture.map(|texture| {
            let cell = codepoint % (ATLAS_COLUMNS * ATLAS_COLUMNS);
            AtlasSlot {
                texture,
                source: Rect::new(
                    (cell % ATLAS_COLUMNS) as f32 * self.advance,
                    (cell / ATLAS_COLUMNS) as f32 * self.line_height,
                    size.x,
                    size.y,
                ),
            }
        });

        Some(GlyphMetrics {
            codepoint,
            advance,
            offset: Vec2::new(0.0, -self.ascent),
            size,
            atlas,
        })
    }

    fn kerning(&self, left: u32, right: u32) -> f32 {
        self.kerning.get(&(left, right)).copied().unwrap_or(0.0)
    }

    fn font_size(&self) -> f32 {
        self.font_size
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn ascent(&self) -> f32 {
        self.ascent
    }
}
