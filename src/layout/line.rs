//! Lines, chunks and per-glyph geometry produced by one layout pass.

use crate::error::LayoutError;
use crate::font::GlyphMetricsProvider;
use crate::geometry::{Rect, Size, Vec2};
use crate::render::TextRenderer;
use crate::style::Color;
use crate::text::measure::{draw_text, DrawParams, GlyphColors};
use serde::Serialize;

/// A run of glyphs on one line sharing one inline style.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChunk {
    /// Code unit index of the chunk's first character.
    pub text_start_index: usize,
    /// Code units covered. Command markup and line breaks are never part of
    /// a chunk.
    pub count: usize,
    /// Decoded codepoints covered, including ones the font cannot draw.
    pub glyph_count: usize,
    /// Pen width (trailing whitespace at the end of a line excluded) and
    /// height.
    pub size: Size,
    /// Vertical offset within the line.
    pub top: f32,
    /// Color set by markup, if any.
    pub color: Option<Color>,
}

impl TextChunk {
    /// The code unit range of this chunk in the laid-out text.
    pub fn text_range(&self) -> std::ops::Range<usize> {
        self.text_start_index..self.text_start_index + self.count
    }

    /// Draw the chunk's text with its first line's top-left at `position`.
    pub fn draw<R, F>(
        &self,
        renderer: &mut R,
        font: &F,
        text: &[u16],
        position: Vec2,
        color: Color,
        params: DrawParams,
    ) -> Result<f32, LayoutError>
    where
        R: TextRenderer + ?Sized,
        F: GlyphMetricsProvider + ?Sized,
    {
        let units = text.get(self.text_range()).unwrap_or_default();
        draw_text(
            renderer,
            font,
            units,
            position,
            GlyphColors::Uniform(color),
            params,
        )
    }
}

/// Geometry of one decoded character, captured when glyph calculation is
/// enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphInfo {
    /// Code unit index in the laid-out text.
    pub index: usize,
    /// Code units occupied (2 for a surrogate pair).
    pub len: usize,
    pub codepoint: u32,
    /// Owning line.
    pub line_index: usize,
    /// Owning chunk within the line; `None` for markup and line breaks.
    pub chunk_index: Option<usize>,
    /// The character's cell in layout space: pen position and advance
    /// across, the chunk's line band down. Zero-width for characters that
    /// do not move the pen.
    pub bounds: Rect,
}

/// One row of laid-out text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLine {
    /// Code unit index of the line's first character.
    pub text_start_index: usize,
    /// Code units covered, including markup and the consumed line break.
    pub count: usize,
    /// Widest extent and height.
    pub size: Size,
    /// Vertical offset from the layout origin.
    pub top: f32,
    pub chunks: Vec<TextChunk>,
    /// Empty unless glyph calculation is enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub glyphs: Vec<GlyphInfo>,
}

impl TextLine {
    pub fn bottom(&self) -> f32 {
        self.top + self.size.height
    }

    /// Whether the code unit `position` falls inside this line.
    pub fn contains_index(&self, position: usize) -> bool {
        self.text_start_index <= position && position < self.text_start_index + self.count
    }

    /// Glyph covering the code unit `index`, counted from the line start.
    pub fn glyph_at_index(&self, index: usize) -> Option<&GlyphInfo> {
        let absolute = self.text_start_index + index;
        self.glyphs
            .iter()
            .find(|g| g.index <= absolute && absolute < g.index + g.len)
    }

    /// Glyph whose cell spans `x` horizontally.
    pub fn glyph_at_x(&self, x: f32) -> Option<&GlyphInfo> {
        self.glyphs
            .iter()
            .find(|g| g.bounds.width > 0.0 && g.bounds.x <= x && x < g.bounds.right())
    }
}
