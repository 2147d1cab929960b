//! # Layout Engine
//!
//! Turns a UTF-16 text, a glyph provider and an optional wrap width into
//! stacked [`TextLine`]s made of [`TextChunk`]s.
//!
//! ## How it works
//!
//! The text is first tokenized into items: glyphs (with their metrics, or
//! none when the font cannot represent the codepoint), hard line breaks and,
//! when enabled, markup commands. A greedy pass then walks the items with a
//! pen:
//!
//! 1. Whitespace always fits. It hangs past the wrap width and marks the
//!    position after it as a break opportunity.
//! 2. Any other glyph that would push the pen past the wrap width ends the
//!    line at the last break opportunity. Without one, the line is forced to
//!    end right before the glyph. A line always keeps at least one glyph, so
//!    every pass makes progress.
//! 3. A hard line break always ends the line and belongs to it.
//! 4. Commands take no width and reset the kerning context.
//!
//! Finally each line is split into chunks at commands, measured, and stacked
//! below the previous line with the configured spacing.

pub mod command;
pub mod line;

pub use command::Command;
pub use line::{GlyphInfo, TextChunk, TextLine};

use crate::error::LayoutError;
use crate::font::{GlyphMetrics, GlyphMetricsProvider};
use crate::geometry::{Rect, Size};
use crate::style::Color;
use crate::text::codepoint::{decode_at, is_whitespace, Codepoints};
use crate::text::measure::{x_advance, LINE_BREAK};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Options that shape layout geometry, plus the draw-time color switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Extra pixels between stacked lines. Negative values overlap lines.
    pub vertical_spacing: i32,
    /// Capture a [`GlyphInfo`] for every character.
    pub calculate_glyphs: bool,
    /// Recognize inline markup commands.
    pub supports_commands: bool,
    /// Keep parsing color commands but draw everything in the base color.
    pub ignore_color_effect: bool,
    /// Give text ending in a hard break an empty last line.
    pub trailing_empty_line: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            vertical_spacing: 0,
            calculate_glyphs: false,
            supports_commands: false,
            ignore_color_effect: false,
            trailing_empty_line: true,
        }
    }
}

/// A single option change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutOption {
    VerticalSpacing(i32),
    CalculateGlyphs(bool),
    SupportsCommands(bool),
    IgnoreColorEffect(bool),
    TrailingEmptyLine(bool),
}

impl LayoutOption {
    /// Parse a `name = value` pair. Names are the camelCase field names of
    /// [`LayoutOptions`].
    pub fn parse(name: &str, value: &str) -> Result<Self, LayoutError> {
        let invalid = || LayoutError::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        };
        let flag = || value.trim().parse::<bool>().map_err(|_| invalid());

        match name {
            "verticalSpacing" => value
                .trim()
                .parse()
                .map(LayoutOption::VerticalSpacing)
                .map_err(|_| invalid()),
            "calculateGlyphs" => flag().map(LayoutOption::CalculateGlyphs),
            "supportsCommands" => flag().map(LayoutOption::SupportsCommands),
            "ignoreColorEffect" => flag().map(LayoutOption::IgnoreColorEffect),
            "trailingEmptyLine" => flag().map(LayoutOption::TrailingEmptyLine),
            _ => Err(invalid()),
        }
    }

    /// Whether changing this option can change geometry.
    pub fn affects_geometry(&self) -> bool {
        !matches!(self, LayoutOption::IgnoreColorEffect(_))
    }
}

impl LayoutOptions {
    /// Apply `option`, reporting whether anything changed.
    pub fn apply(&mut self, option: LayoutOption) -> bool {
        fn set<T: PartialEq>(slot: &mut T, value: T) -> bool {
            if *slot == value {
                return false;
            }
            *slot = value;
            true
        }

        match option {
            LayoutOption::VerticalSpacing(v) => set(&mut self.vertical_spacing, v),
            LayoutOption::CalculateGlyphs(v) => set(&mut self.calculate_glyphs, v),
            LayoutOption::SupportsCommands(v) => set(&mut self.supports_commands, v),
            LayoutOption::IgnoreColorEffect(v) => set(&mut self.ignore_color_effect, v),
            LayoutOption::TrailingEmptyLine(v) => set(&mut self.trailing_empty_line, v),
        }
    }
}

/// The output of one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    pub lines: Vec<TextLine>,
    pub size: Size,
}

#[derive(Debug, Clone, Copy)]
enum ItemKind {
    Glyph {
        codepoint: u32,
        metrics: Option<GlyphMetrics>,
        whitespace: bool,
    },
    Break,
    Command(Command),
}

#[derive(Debug, Clone, Copy)]
struct Item {
    index: usize,
    len: usize,
    kind: ItemKind,
}

/// Style state carried from chunk to chunk, across lines.
#[derive(Debug, Clone, Copy, Default)]
struct InlineStyle {
    color: Option<Color>,
    vertical_offset: f32,
}

impl InlineStyle {
    fn apply(&mut self, command: Command) {
        match command {
            Command::Color(color) => self.color = Some(color),
            Command::ResetColor => self.color = None,
            Command::VerticalOffset(offset) => self.vertical_offset = offset,
            Command::ResetVerticalOffset => self.vertical_offset = 0.0,
            Command::LineBreak => {}
        }
    }
}

/// Pen state over a run of items.
#[derive(Debug, Clone, Copy, Default)]
struct Pen {
    x: f32,
    prev: Option<GlyphMetrics>,
    /// Whether any glyph with metrics has been placed.
    placed: bool,
}

/// Runs the line-breaking state machine.
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    pub options: LayoutOptions,
}

impl LayoutBuilder {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Lay out `text`, wrapping at `width` when given.
    pub fn layout<F>(&self, text: &[u16], font: &F, width: Option<f32>) -> LayoutResult
    where
        F: GlyphMetricsProvider + ?Sized,
    {
        if text.is_empty() {
            return LayoutResult::default();
        }

        let items = self.tokenize(text, font);
        let ranges = self.break_lines(&items, font, width);

        let spacing = self.options.vertical_spacing as f32;
        let mut style = InlineStyle::default();
        let mut lines: Vec<TextLine> = Vec::with_capacity(ranges.len());
        let mut top = 0.0f32;
        let mut size = Size::ZERO;

        for (line_index, range) in ranges.into_iter().enumerate() {
            if line_index > 0 {
                top += spacing;
            }
            let line = self.build_line(text, &items, range, font, line_index, top, &mut style);
            top += line.size.height;
            size.width = size.width.max(line.size.width);
            size.height = size.height.max(line.bottom());
            lines.push(line);
        }

        debug_assert!(lines
            .windows(2)
            .all(|w| w[0].text_start_index + w[0].count == w[1].text_start_index));
        debug_assert!(lines
            .iter()
            .all(|l| l.size.width >= 0.0 && l.size.height >= 0.0));

        log::debug!(
            "layout: {} units, width {:?} -> {} lines, {}x{}",
            text.len(),
            width,
            lines.len(),
            size.width,
            size.height
        );

        LayoutResult { lines, size }
    }

    fn tokenize<F>(&self, text: &[u16], font: &F) -> Vec<Item>
    where
        F: GlyphMetricsProvider + ?Sized,
    {
        let mut items = Vec::with_capacity(text.len());
        let mut index = 0;

        while index < text.len() {
            if self.options.supports_commands && text[index] == command::INTRODUCER {
                if let Some((cmd, len)) = command::parse(text, index) {
                    let kind = match cmd {
                        Command::LineBreak => ItemKind::Break,
                        other => ItemKind::Command(other),
                    };
                    items.push(Item { index, len, kind });
                    index += len;
                    continue;
                }
            }

            let Some((codepoint, len)) = decode_at(text, index) else {
                break;
            };
            let kind = if codepoint == LINE_BREAK {
                ItemKind::Break
            } else {
                ItemKind::Glyph {
                    codepoint,
                    metrics: font.glyph(None, codepoint),
                    whitespace: is_whitespace(codepoint),
                }
            };
            items.push(Item { index, len, kind });
            index += len;
        }

        items
    }

    /// Pen state after walking `items` from a line start.
    fn run_pen<F>(items: &[Item], font: &F) -> Pen
    where
        F: GlyphMetricsProvider + ?Sized,
    {
        let mut pen = Pen::default();
        for item in items {
            match item.kind {
                ItemKind::Glyph {
                    metrics: Some(m), ..
                } => {
                    pen.x += x_advance(font, &m, pen.prev.as_ref());
                    pen.prev = Some(m);
                    pen.placed = true;
                }
                ItemKind::Command(_) => pen.prev = None,
                _ => {}
            }
        }
        pen
    }

    /// Split items into per-line item ranges.
    fn break_lines<F>(&self, items: &[Item], font: &F, width: Option<f32>) -> Vec<Range<usize>>
    where
        F: GlyphMetricsProvider + ?Sized,
    {
        let mut ranges = Vec::new();
        let mut line_start = 0;
        let mut pen = Pen::default();
        let mut opportunity: Option<usize> = None;

        for (i, item) in items.iter().enumerate() {
            match item.kind {
                ItemKind::Break => {
                    ranges.push(line_start..i + 1);
                    line_start = i + 1;
                    pen = Pen::default();
                    opportunity = None;
                }
                ItemKind::Command(_) => pen.prev = None,
                ItemKind::Glyph { metrics: None, .. } => {}
                ItemKind::Glyph {
                    metrics: Some(m),
                    whitespace: true,
                    ..
                } => {
                    pen.x += x_advance(font, &m, pen.prev.as_ref());
                    pen.prev = Some(m);
                    pen.placed = true;
                    opportunity = Some(i + 1);
                }
                ItemKind::Glyph {
                    metrics: Some(m),
                    whitespace: false,
                    ..
                } => loop {
                    let advance = x_advance(font, &m, pen.prev.as_ref());
                    let overflows = width.is_some_and(|w| pen.x + advance > w) && pen.placed;
                    if !overflows {
                        pen.x += advance;
                        pen.prev = Some(m);
                        pen.placed = true;
                        break;
                    }

                    // Break at the last opportunity, or force one before
                    // this glyph.
                    let break_at = opportunity
                        .filter(|&o| o > line_start && o <= i)
                        .unwrap_or(i);
                    ranges.push(line_start..break_at);
                    line_start = break_at;
                    opportunity = None;
                    pen = Self::run_pen(&items[line_start..i], font);
                },
            }
        }

        if line_start < items.len() {
            ranges.push(line_start..items.len());
        } else if self.options.trailing_empty_line
            && matches!(items.last().map(|item| item.kind), Some(ItemKind::Break))
        {
            ranges.push(items.len()..items.len());
        }

        ranges
    }

    #[allow(clippy::too_many_arguments)]
    fn build_line<F>(
        &self,
        text: &[u16],
        items: &[Item],
        range: Range<usize>,
        font: &F,
        line_index: usize,
        top: f32,
        style: &mut InlineStyle,
    ) -> TextLine
    where
        F: GlyphMetricsProvider + ?Sized,
    {
        let line_items = &items[range];
        let text_start_index = line_items.first().map_or(text.len(), |item| item.index);
        let count = line_items.iter().map(|item| item.len).sum();

        let ascent = font.ascent();
        let line_height = font.line_height();
        let capture = self.options.calculate_glyphs;

        let mut chunks: Vec<TextChunk> = Vec::new();
        let mut trims: Vec<ChunkTrim> = Vec::new();
        let mut glyphs: Vec<GlyphInfo> = Vec::new();
        let mut current: Option<OpenChunk> = None;
        let mut chunk_x = 0.0f32;

        for item in line_items {
            match item.kind {
                ItemKind::Glyph {
                    codepoint,
                    metrics,
                    whitespace,
                } => {
                    let state = current.get_or_insert_with(|| {
                        chunks.push(TextChunk {
                            text_start_index: item.index,
                            count: 0,
                            glyph_count: 0,
                            size: Size::new(0.0, line_height),
                            top: style.vertical_offset,
                            color: style.color,
                        });
                        OpenChunk::default()
                    });
                    let chunk_index = chunks.len() - 1;
                    let chunk = &mut chunks[chunk_index];
                    chunk.count += item.len;
                    chunk.glyph_count += 1;

                    let x = chunk_x + state.pen.x;
                    let mut advance = 0.0;
                    if let Some(m) = metrics {
                        advance = x_advance(font, &m, state.pen.prev.as_ref());
                        state.pen.x += advance;
                        state.pen.prev = Some(m);
                        if whitespace {
                            state.trim.whitespace += advance;
                        } else {
                            state.trim.whitespace = 0.0;
                            state.trim.has_ink = true;
                        }
                        if !m.is_empty() {
                            let bottom = ascent + m.offset.y + m.size.y;
                            chunk.size.height = chunk.size.height.max(bottom);
                        }
                    }

                    if capture {
                        glyphs.push(GlyphInfo {
                            index: item.index,
                            len: item.len,
                            codepoint,
                            line_index,
                            chunk_index: Some(chunk_index),
                            bounds: Rect::new(x, top + chunk.top, advance, line_height),
                        });
                    }
                }
                ItemKind::Break | ItemKind::Command(_) => {
                    if let Some(state) = current.take() {
                        if let Some(chunk) = chunks.last_mut() {
                            chunk.size.width = state.pen.x;
                        }
                        trims.push(state.trim);
                        chunk_x += state.pen.x;
                    }
                    if capture {
                        // Markup and breaks still map every character.
                        let end = item.index + item.len;
                        glyphs.extend(
                            Codepoints::starting_at(text, item.index)
                                .take_while(|d| d.index < end)
                                .map(|d| GlyphInfo {
                                    index: d.index,
                                    len: d.len,
                                    codepoint: d.codepoint,
                                    line_index,
                                    chunk_index: None,
                                    bounds: Rect::new(chunk_x, top, 0.0, line_height),
                                }),
                        );
                    }
                    if let ItemKind::Command(cmd) = item.kind {
                        style.apply(cmd);
                    }
                }
            }
        }
        if let Some(state) = current.take() {
            if let Some(chunk) = chunks.last_mut() {
                chunk.size.width = state.pen.x;
            }
            trims.push(state.trim);
        }
        debug_assert_eq!(chunks.len(), trims.len());

        // Trailing whitespace hangs past the wrap width; it is not part of
        // the line's extent.
        for (chunk, trim) in chunks.iter_mut().zip(trims.iter()).rev() {
            chunk.size.width = (chunk.size.width - trim.whitespace).max(0.0);
            if trim.has_ink {
                break;
            }
        }

        let width = chunks.iter().map(|c| c.size.width).sum::<f32>();
        let height = chunks
            .iter()
            .map(|c| c.top + c.size.height)
            .fold(line_height, f32::max);

        TextLine {
            text_start_index,
            count,
            size: Size::new(width, height),
            top,
            chunks,
            glyphs,
        }
    }
}

/// Whitespace at the end of a chunk, subtracted from its width when the
/// chunk ends its line.
#[derive(Debug, Clone, Copy, Default)]
struct ChunkTrim {
    whitespace: f32,
    has_ink: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct OpenChunk {
    pen: Pen,
    trim: ChunkTrim,
}
