//! Glyph measurement primitives.
//!
//! Stateless walks over a codepoint run that accumulate pen advances and
//! kerning, bounding boxes and per-glyph rectangles. The layout builder uses
//! [`x_advance`] internally; everything else serves plain (non-wrapped) text.
//!
//! All accumulation happens in the font's pixel unit. The caller's scale is
//! applied once, at the end, divided by the font's render multiplier.

use super::codepoint::Codepoints;
use crate::error::LayoutError;
use crate::font::{GlyphMetrics, GlyphMetricsProvider};
use crate::geometry::{Bounds, Rect, Vec2};
use crate::render::{SpriteDraw, TextRenderer};
use crate::style::Color;

/// The hard line break.
pub const LINE_BREAK: u32 = '\n' as u32;

/// Horizontal pen movement after `glyph`, including the pair adjustment
/// against the glyph drawn immediately before it on the same line.
pub fn x_advance<F>(font: &F, glyph: &GlyphMetrics, prev: Option<&GlyphMetrics>) -> f32
where
    F: GlyphMetricsProvider + ?Sized,
{
    match prev {
        Some(prev) => glyph.advance + font.kerning(prev.codepoint, glyph.codepoint),
        None => glyph.advance,
    }
}

fn effective_scale<F: GlyphMetricsProvider + ?Sized>(font: &F, scale: Vec2) -> Vec2 {
    scale * (1.0 / font.render_multiplier())
}

/// Bounding box of `text` drawn with its first line's top at `position`.
///
/// Line breaks return the pen to `position.x` and move down one line height.
/// Codepoints without a glyph are skipped. Empty input yields a zero-extent
/// box at `position`.
pub fn text_bounds<F>(font: &F, text: &[u16], position: Vec2, scale: Vec2) -> Bounds
where
    F: GlyphMetricsProvider + ?Sized,
{
    let mut bounds = Bounds::at(position);
    if text.is_empty() {
        bounds.apply_scale(effective_scale(font, scale));
        return bounds;
    }

    let line_height = font.line_height();
    let start_x = position.x;
    let mut x = position.x;
    let mut y = position.y + font.ascent();
    bounds.y = y;
    bounds.y2 = y;

    let mut prev: Option<GlyphMetrics> = None;
    for decoded in Codepoints::new(text) {
        if decoded.codepoint == LINE_BREAK {
            x = start_x;
            y += line_height;
            prev = None;
            continue;
        }

        let Some(glyph) = font.glyph(None, decoded.codepoint) else {
            continue;
        };

        let x0 = x + glyph.offset.x;
        bounds.x = bounds.x.min(x0);
        x += x_advance(font, &glyph, prev.as_ref());
        bounds.x2 = bounds.x2.max(x);

        let y0 = y + glyph.offset.y;
        let y1 = y0 + glyph.size.y;
        bounds.y = bounds.y.min(y0);
        bounds.y2 = bounds.y2.max(y1);

        prev = Some(glyph);
    }

    bounds.apply_scale(effective_scale(font, scale));
    bounds
}

/// Size of `text` measured from the origin: the far corner of its bounds.
pub fn measure_string<F>(font: &F, text: &[u16], scale: Vec2) -> Vec2
where
    F: GlyphMetricsProvider + ?Sized,
{
    let bounds = text_bounds(font, text, Vec2::ZERO, scale);
    Vec2::new(bounds.x2, bounds.y2)
}

/// One rectangle per decoded codepoint, for caret placement.
///
/// Drawable glyphs get their render rectangle. Line breaks and codepoints
/// without a glyph get a zero-width rectangle of line height at the pen, so
/// every character offset maps to a position.
pub fn glyph_rects<F>(font: &F, text: &[u16], position: Vec2, origin: Vec2, scale: Vec2) -> Vec<Rect>
where
    F: GlyphMetricsProvider + ?Sized,
{
    let mut rects = Vec::new();
    if text.is_empty() {
        return rects;
    }

    let scale = effective_scale(font, scale);
    let ascent = font.ascent();
    let line_height = font.line_height();
    let mut pen = Vec2::new(-origin.x, -origin.y + ascent);

    let mut prev: Option<GlyphMetrics> = None;
    for decoded in Codepoints::new(text) {
        let mut rect = Rect::new(pen.x, pen.y - ascent, 0.0, line_height);
        if decoded.codepoint == LINE_BREAK {
            pen.x = -origin.x;
            pen.y += line_height;
            prev = None;
        } else if let Some(glyph) = font.glyph(None, decoded.codepoint) {
            rect = glyph.render_rect().offset(pen);
            pen.x += x_advance(font, &glyph, prev.as_ref());
            prev = Some(glyph);
        }

        rects.push(rect.scaled(scale).offset(position));
    }

    rects
}

/// Colors for [`draw_text`]: one for the whole run, or one per codepoint.
#[derive(Debug, Clone, Copy)]
pub enum GlyphColors<'a> {
    Uniform(Color),
    PerGlyph(&'a [Color]),
}

impl GlyphColors<'_> {
    fn at(&self, index: usize) -> Color {
        match self {
            GlyphColors::Uniform(color) => *color,
            GlyphColors::PerGlyph(colors) => colors[index],
        }
    }
}

/// Parameters of a draw call besides text, position and color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    pub scale: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Rotation center.
    pub origin: Vec2,
    pub layer_depth: f32,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self {
            scale: Vec2::ONE,
            rotation: 0.0,
            origin: Vec2::ZERO,
            layer_depth: 0.0,
        }
    }
}

/// Draw unwrapped text, emitting one sprite per visible glyph.
///
/// Fails before drawing anything when the renderer has no texture manager
/// or when per-glyph colors do not cover every codepoint. Returns the pen's
/// final horizontal position in unscaled pixels.
pub fn draw_text<R, F>(
    renderer: &mut R,
    font: &F,
    text: &[u16],
    position: Vec2,
    colors: GlyphColors<'_>,
    params: DrawParams,
) -> Result<f32, LayoutError>
where
    R: TextRenderer + ?Sized,
    F: GlyphMetricsProvider + ?Sized,
{
    if renderer.texture_manager().is_none() {
        log::warn!("draw refused: renderer has no texture manager");
        return Err(LayoutError::MissingTextureManager);
    }
    if let GlyphColors::PerGlyph(colors) = colors {
        let needed = Codepoints::new(text).count();
        if colors.len() < needed {
            return Err(LayoutError::ColorCount {
                needed,
                given: colors.len(),
            });
        }
    }
    if text.is_empty() {
        return Ok(0.0);
    }

    let scale = effective_scale(font, params.scale);
    let mut pen = Vec2::new(0.0, font.ascent());
    let mut prev: Option<GlyphMetrics> = None;

    for (pos, decoded) in Codepoints::new(text).enumerate() {
        if decoded.codepoint == LINE_BREAK {
            pen.x = 0.0;
            pen.y += font.line_height();
            prev = None;
            continue;
        }

        let Some(glyph) = font.glyph(renderer.texture_manager(), decoded.codepoint) else {
            continue;
        };

        if let (false, Some(slot)) = (glyph.is_empty(), glyph.atlas) {
            let render_offset = glyph.offset + pen;
            renderer.draw(&SpriteDraw {
                texture: slot.texture,
                position,
                source: slot.source,
                color: colors.at(pos),
                rotation: params.rotation,
                origin: params.origin - render_offset,
                scale,
                layer_depth: params.layer_depth,
            });
        }

        pen.x += x_advance(font, &glyph, prev.as_ref());
        prev = Some(glyph);
    }

    Ok(pen.x)
}

/// Measurement on any glyph provider, taking Rust strings.
pub trait TextMeasure: GlyphMetricsProvider {
    fn text_bounds(&self, text: &str, position: Vec2, scale: Vec2) -> Bounds {
        let units = super::utf16(text);
        text_bounds(self, &units, position, scale)
    }

    fn measure_string(&self, text: &str) -> Vec2 {
        let units = super::utf16(text);
        measure_string(self, &units, Vec2::ONE)
    }

    fn glyph_rects(&self, text: &str, position: Vec2, origin: Vec2, scale: Vec2) -> Vec<Rect> {
        let units = super::utf16(text);
        glyph_rects(self, &units, position, origin, scale)
    }

    fn draw_text(
        &self,
        renderer: &mut dyn TextRenderer,
        text: &str,
        position: Vec2,
        color: Color,
        params: DrawParams,
    ) -> Result<f32, LayoutError> {
        let units = super::utf16(text);
        draw_text(renderer, self, &units, position, GlyphColors::Uniform(color), params)
    }
}

impl<T: GlyphMetricsProvider + ?Sized> TextMeasure for T {}
