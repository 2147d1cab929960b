//! # Rich Text Layout
//!
//! [`RichTextLayout`] owns the inputs of a layout (text, font, wrap width,
//! options) and its current result. Setters only record changes; the layout
//! is recomputed on the next read. Sizes are additionally memoized per wrap
//! width, so toggling between a few widths does not lay out again.

pub mod cache;

pub use cache::{MeasureCache, WrapKey};

use crate::error::LayoutError;
use crate::font::GlyphMetricsProvider;
use crate::geometry::{Size, Transform, Vec2};
use crate::layout::{GlyphInfo, LayoutBuilder, LayoutOption, LayoutOptions, LayoutResult, TextLine};
use crate::render::TextRenderer;
use crate::style::Color;
use crate::text::measure::DrawParams;
use std::rc::Rc;

static EMPTY: LayoutResult = LayoutResult {
    lines: Vec::new(),
    size: Size::ZERO,
};

#[derive(Debug)]
enum LayoutState {
    /// Inputs changed since the last pass.
    Dirty,
    Clean(LayoutResult),
}

/// Lazily laid-out rich text.
pub struct RichTextLayout {
    font: Rc<dyn GlyphMetricsProvider>,
    text: Vec<u16>,
    width: Option<f32>,
    builder: LayoutBuilder,
    state: LayoutState,
    measures: MeasureCache,
    passes: usize,
}

impl std::fmt::Debug for RichTextLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RichTextLayout")
            .field("text", &String::from_utf16_lossy(&self.text))
            .field("width", &self.width)
            .field("options", &self.builder.options)
            .field("state", &self.state)
            .field("measures", &self.measures.len())
            .finish()
    }
}

impl RichTextLayout {
    pub fn new(font: Rc<dyn GlyphMetricsProvider>) -> Self {
        Self {
            font,
            text: Vec::new(),
            width: None,
            builder: LayoutBuilder::default(),
            state: LayoutState::Dirty,
            measures: MeasureCache::default(),
            passes: 0,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_width(mut self, width: Option<f32>) -> Self {
        self.set_width(width);
        self
    }

    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.set_options(options);
        self
    }

    // ── Inputs ─────────────────────────────────────────────────

    /// The text as UTF-16 code units; all indices refer to these.
    pub fn text(&self) -> &[u16] {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.set_text_utf16(crate::text::utf16(text));
    }

    /// Set raw UTF-16 text. Unpaired surrogates are accepted.
    pub fn set_text_utf16(&mut self, units: impl Into<Vec<u16>>) {
        let units = units.into();
        if units == self.text {
            return;
        }
        self.text = units;
        self.invalidate_layout();
        self.invalidate_measures();
    }

    pub fn font(&self) -> &Rc<dyn GlyphMetricsProvider> {
        &self.font
    }

    pub fn set_font(&mut self, font: Rc<dyn GlyphMetricsProvider>) {
        if Rc::ptr_eq(&font, &self.font) {
            return;
        }
        self.font = font;
        self.invalidate_layout();
        self.invalidate_measures();
    }

    pub fn width(&self) -> Option<f32> {
        self.width
    }

    /// Change the wrap width. Sizes measured at other widths stay cached.
    pub fn set_width(&mut self, width: Option<f32>) {
        if width == self.width {
            return;
        }
        self.width = width;
        self.invalidate_layout();
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.builder.options
    }

    pub fn set_option(&mut self, option: LayoutOption) {
        if !self.builder.options.apply(option) {
            return;
        }
        if option.affects_geometry() {
            self.invalidate_layout();
            self.invalidate_measures();
        }
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        let LayoutOptions {
            vertical_spacing,
            calculate_glyphs,
            supports_commands,
            ignore_color_effect,
            trailing_empty_line,
        } = options;
        self.set_option(LayoutOption::VerticalSpacing(vertical_spacing));
        self.set_option(LayoutOption::CalculateGlyphs(calculate_glyphs));
        self.set_option(LayoutOption::SupportsCommands(supports_commands));
        self.set_option(LayoutOption::IgnoreColorEffect(ignore_color_effect));
        self.set_option(LayoutOption::TrailingEmptyLine(trailing_empty_line));
    }

    // ── Layout ─────────────────────────────────────────────────

    pub fn is_dirty(&self) -> bool {
        matches!(self.state, LayoutState::Dirty)
    }

    /// Number of layout passes run so far.
    pub fn layout_passes(&self) -> usize {
        self.passes
    }

    fn invalidate_layout(&mut self) {
        self.state = LayoutState::Dirty;
    }

    fn invalidate_measures(&mut self) {
        self.measures.clear();
    }

    fn run_layout(&mut self, width: Option<f32>) -> LayoutResult {
        self.passes += 1;
        let result = self.builder.layout(&self.text, self.font.as_ref(), width);
        self.measures.insert(width, result.size);
        result
    }

    fn update(&mut self) {
        if let LayoutState::Dirty = self.state {
            let result = self.run_layout(self.width);
            self.state = LayoutState::Clean(result);
        }
    }

    fn result(&self) -> &LayoutResult {
        match &self.state {
            LayoutState::Clean(result) => result,
            LayoutState::Dirty => &EMPTY,
        }
    }

    pub fn lines(&mut self) -> &[TextLine] {
        self.update();
        &self.result().lines
    }

    /// Size at the current width. Answered from the cache when this width
    /// was measured before and nothing geometric changed since.
    pub fn size(&mut self) -> Size {
        if let LayoutState::Clean(result) = &self.state {
            return result.size;
        }
        if let Some(size) = self.measures.get(self.width) {
            log::trace!("measure cache hit for width {:?}", self.width);
            return size;
        }
        self.update();
        self.result().size
    }

    /// Size the text would have at `width`, without changing the current
    /// width or layout.
    pub fn measure(&mut self, width: Option<f32>) -> Size {
        if width == self.width {
            return self.size();
        }
        if let Some(size) = self.measures.get(width) {
            log::trace!("measure cache hit for width {:?}", width);
            return size;
        }
        log::trace!("measure cache miss for width {:?}", width);
        self.run_layout(width).size
    }

    // ── Queries ────────────────────────────────────────────────

    /// The line containing the code unit `position`. Negative positions map
    /// to the first line and positions past the end to the last one.
    pub fn line_at_cursor(&mut self, position: isize) -> Option<&TextLine> {
        let lines = self.lines();
        if position < 0 {
            return lines.first();
        }
        let position = position as usize;
        lines
            .iter()
            .find(|line| line.contains_index(position))
            .or_else(|| lines.last())
    }

    /// The line whose vertical band contains `y`. Unlike cursor lookup this
    /// does not clamp: above the first line or below the last one is `None`.
    pub fn line_at_y(&mut self, y: f32) -> Option<&TextLine> {
        if self.text.is_empty() || y < 0.0 {
            return None;
        }
        self.lines()
            .iter()
            .find(|line| line.top <= y && y < line.bottom())
    }

    /// Glyph geometry for the code unit `index`. Requires glyph calculation.
    pub fn glyph_at_char_index(&mut self, index: usize) -> Option<&GlyphInfo> {
        let mut index = index;
        for line in self.lines() {
            if index >= line.count {
                index -= line.count;
            } else {
                return line.glyph_at_index(index);
            }
        }
        None
    }

    // ── Drawing ────────────────────────────────────────────────

    /// Draw all lines with the layout origin placed by `position` and
    /// `params`. Chunk colors from markup override `color` unless color
    /// effects are ignored.
    pub fn draw<R>(
        &mut self,
        renderer: &mut R,
        position: Vec2,
        color: Color,
        params: DrawParams,
    ) -> Result<(), LayoutError>
    where
        R: TextRenderer + ?Sized,
    {
        if renderer.texture_manager().is_none() {
            log::warn!("draw refused: renderer has no texture manager");
            return Err(LayoutError::MissingTextureManager);
        }

        self.update();
        let transform = Transform::sprite(position, params.scale, params.rotation, params.origin);
        let chunk_params = DrawParams {
            origin: Vec2::ZERO,
            ..params
        };
        let ignore_color = self.builder.options.ignore_color_effect;

        for line in &self.result().lines {
            let mut x = 0.0;
            for chunk in &line.chunks {
                let chunk_color = match chunk.color {
                    Some(c) if !ignore_color => c,
                    _ => color,
                };
                let at = transform.apply(Vec2::new(x, line.top + chunk.top));
                chunk.draw(
                    renderer,
                    self.font.as_ref(),
                    &self.text,
                    at,
                    chunk_color,
                    chunk_params,
                )?;
                x += chunk.size.width;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FixedFont;
    use crate::render::{SpriteDraw, TextureId, TextureManager};

    fn layout(text: &str) -> RichTextLayout {
        RichTextLayout::new(Rc::new(FixedFont::new(8.0, 20.0).with_texture(TextureId(1))))
            .with_text(text)
    }

    struct Atlas;

    impl TextureManager for Atlas {
        fn texture_size(&self, _texture: TextureId) -> Option<Vec2> {
            Some(Vec2::new(256.0, 256.0))
        }
    }

    #[derive(Default)]
    struct Recorder {
        has_atlas: bool,
        sprites: Vec<SpriteDraw>,
    }

    impl TextRenderer for Recorder {
        fn texture_manager(&self) -> Option<&dyn TextureManager> {
            if self.has_atlas {
                Some(&Atlas)
            } else {
                None
            }
        }

        fn draw(&mut self, sprite: &SpriteDraw) {
            self.sprites.push(*sprite);
        }
    }

    #[test]
    fn test_lazy_until_read() {
        let mut rt = layout("Hello world");
        assert!(rt.is_dirty());
        assert_eq!(rt.layout_passes(), 0);
        assert_eq!(rt.size(), Size::new(88.0, 20.0));
        assert_eq!(rt.layout_passes(), 1);
        assert!(!rt.is_dirty());
    }

    #[test]
    fn test_wrap_hello_world() {
        let mut rt = layout("Hello world").with_width(Some(48.0));
        let counts: Vec<_> = rt.lines().iter().map(|l| (l.text_start_index, l.count)).collect();
        assert_eq!(counts, vec![(0, 6), (6, 5)]);
        assert_eq!(rt.size(), Size::new(40.0, 40.0));
    }

    #[test]
    fn test_width_changes_hit_measure_cache() {
        let mut rt = layout("Hello world");
        rt.size();
        rt.set_width(Some(48.0));
        assert_eq!(rt.size(), Size::new(40.0, 40.0));
        assert_eq!(rt.layout_passes(), 2);

        rt.set_width(None);
        assert_eq!(rt.size(), Size::new(88.0, 20.0));
        assert_eq!(rt.layout_passes(), 2);

        // Lines still need a real pass.
        assert_eq!(rt.lines().len(), 1);
        assert_eq!(rt.layout_passes(), 3);
    }

    #[test]
    fn test_text_change_clears_cache() {
        let mut rt = layout("Hello world");
        assert_eq!(rt.measure(Some(48.0)), Size::new(40.0, 40.0));
        assert_eq!(rt.measure(Some(48.0)), Size::new(40.0, 40.0));
        assert_eq!(rt.layout_passes(), 1);

        rt.set_text("Hi");
        assert_eq!(rt.measure(Some(48.0)), Size::new(16.0, 20.0));
        assert_eq!(rt.layout_passes(), 2);
    }

    #[test]
    fn test_setting_same_values_keeps_layout() {
        let mut rt = layout("abc");
        rt.size();
        rt.set_text("abc");
        rt.set_width(None);
        let font = Rc::clone(rt.font());
        rt.set_font(font);
        assert!(!rt.is_dirty());
    }

    #[test]
    fn test_new_font_invalidates() {
        let mut rt = layout("abc");
        assert_eq!(rt.size().width, 24.0);
        rt.set_font(Rc::new(FixedFont::new(10.0, 20.0)));
        assert!(rt.is_dirty());
        assert_eq!(rt.size().width, 30.0);
    }

    #[test]
    fn test_color_option_does_not_invalidate() {
        let mut rt = layout("a\nb");
        rt.size();
        rt.set_option(LayoutOption::IgnoreColorEffect(true));
        assert!(!rt.is_dirty());
        rt.set_option(LayoutOption::VerticalSpacing(5));
        assert!(rt.is_dirty());
        assert_eq!(rt.size().height, 45.0);
    }

    #[test]
    fn test_line_at_cursor_clamps() {
        let mut rt = layout("Hello world").with_width(Some(48.0));
        assert_eq!(rt.line_at_cursor(-5).map(|l| l.text_start_index), Some(0));
        assert_eq!(rt.line_at_cursor(3).map(|l| l.text_start_index), Some(0));
        assert_eq!(rt.line_at_cursor(6).map(|l| l.text_start_index), Some(6));
        assert_eq!(rt.line_at_cursor(100).map(|l| l.text_start_index), Some(6));
        assert!(layout("").line_at_cursor(0).is_none());
    }

    #[test]
    fn test_line_at_y_does_not_clamp() {
        let mut rt = layout("Hello world").with_width(Some(48.0));
        assert_eq!(rt.line_at_y(5.0).map(|l| l.text_start_index), Some(0));
        assert_eq!(rt.line_at_y(25.0).map(|l| l.text_start_index), Some(6));
        assert!(rt.line_at_y(40.0).is_none());
        assert!(rt.line_at_y(-1.0).is_none());
        assert!(layout("").line_at_y(0.0).is_none());
    }

    #[test]
    fn test_glyph_at_char_index() {
        let mut rt = layout("Hello world").with_width(Some(48.0));
        assert!(rt.glyph_at_char_index(7).is_none());

        rt.set_option(LayoutOption::CalculateGlyphs(true));
        let glyph = rt.glyph_at_char_index(7).copied().unwrap();
        assert_eq!(glyph.codepoint, 'o' as u32);
        assert_eq!(glyph.line_index, 1);
        assert_eq!(glyph.bounds, crate::geometry::Rect::new(8.0, 20.0, 8.0, 20.0));
        assert!(rt.glyph_at_char_index(11).is_none());
    }

    #[test]
    fn test_draw_places_lines_and_chunks() {
        let mut rt = layout("ab cd").with_width(Some(24.0));
        let mut r = Recorder {
            has_atlas: true,
            ..Default::default()
        };
        rt.draw(&mut r, Vec2::new(10.0, 5.0), Color::WHITE, DrawParams::default())
            .unwrap();

        // Spaces have no ink.
        assert_eq!(r.sprites.len(), 4);
        assert_eq!(r.sprites[2].position, Vec2::new(10.0, 25.0));
        assert_eq!(r.sprites[3].origin, Vec2::new(-8.0, 0.0));
        assert!(r.sprites.iter().all(|s| s.color == Color::WHITE));
    }

    #[test]
    fn test_draw_chunk_colors() {
        let mut rt = layout("/c[red]ab/cdc")
            .with_options(LayoutOptions {
                supports_commands: true,
                ..Default::default()
            });
        let mut r = Recorder {
            has_atlas: true,
            ..Default::default()
        };
        rt.draw(&mut r, Vec2::ZERO, Color::WHITE, DrawParams::default())
            .unwrap();
        let colors: Vec<_> = r.sprites.iter().map(|s| s.color).collect();
        let red = Color::rgb(1.0, 0.0, 0.0);
        assert_eq!(colors, vec![red, red, Color::WHITE]);
        // The last chunk starts after the first one's width.
        assert_eq!(r.sprites[2].position, Vec2::new(16.0, 0.0));

        rt.set_option(LayoutOption::IgnoreColorEffect(true));
        r.sprites.clear();
        rt.draw(&mut r, Vec2::ZERO, Color::WHITE, DrawParams::default())
            .unwrap();
        assert!(r.sprites.iter().all(|s| s.color == Color::WHITE));
    }

    #[test]
    fn test_draw_without_texture_manager_fails() {
        let mut rt = layout("abc");
        let mut r = Recorder::default();
        let err = rt
            .draw(&mut r, Vec2::ZERO, Color::BLACK, DrawParams::default())
            .unwrap_err();
        assert!(matches!(err, LayoutError::MissingTextureManager));
        assert!(r.sprites.is_empty());
    }

    #[test]
    fn test_malformed_utf16_maps_every_index() {
        let mut rt = layout("").with_width(Some(16.0));
        rt.set_option(LayoutOption::CalculateGlyphs(true));
        rt.set_text_utf16(vec![0xD83D, b'a' as u16, 0xDE00, b' ' as u16, b'b' as u16, 0xD83D]);

        let spans: Vec<_> = rt.lines().iter().map(|l| (l.text_start_index, l.count)).collect();
        assert_eq!(spans, vec![(0, 4), (4, 2)]);
        for i in 0..6 {
            let glyph = rt.glyph_at_char_index(i).copied().unwrap();
            assert_eq!(glyph.index, i);
        }
        assert!(rt.glyph_at_char_index(6).is_none());
    }
}
