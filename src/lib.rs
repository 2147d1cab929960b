//! # glyphflow
//!
//! Word-wrapped rich text layout against abstract glyph metrics.
//!
//! glyphflow measures and lays out text without ever touching pixels. Fonts
//! are anything that can answer "how wide is this glyph, how tall is a
//! line, how much do these two glyphs kern". Drawing produces positioned
//! sprites for a renderer the application supplies.
//!
//! Text is handled as UTF-16 code units throughout, so indices line up with
//! editors and caret APIs that count that way.
//!
//! ## Architecture
//!
//! ```text
//! Input (&str / UTF-16 / JSON job)
//!       ↓
//!   [text]         Codepoint decoding, advances, bounds, plain drawing
//!       ↓
//!   [layout]       Greedy line breaking into lines and styled chunks
//!       ↓
//!   [rich_text]    Lazy layout state, size cache, hit testing, drawing
//!       ↓
//!   [render]       Sprites handed to the application's renderer
//! ```

pub mod error;
pub mod font;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod render;
pub mod rich_text;
pub mod style;
pub mod text;

pub use error::LayoutError;
pub use font::{FixedFont, GlyphMetrics, GlyphMetricsProvider, TtfFont};
pub use geometry::{Bounds, Rect, Size, Transform, Vec2};
pub use layout::{
    GlyphInfo, LayoutBuilder, LayoutOption, LayoutOptions, LayoutResult, TextChunk, TextLine,
};
pub use model::{layout_json, LayoutJob, LayoutReport};
pub use render::{AtlasSlot, SpriteDraw, TextRenderer, TextureId, TextureManager};
pub use rich_text::RichTextLayout;
pub use style::Color;
pub use text::measure::{DrawParams, GlyphColors, TextMeasure};
