//! # Text
//!
//! Codepoint decoding over UTF-16 buffers and the measurement primitives
//! built on it.

pub mod codepoint;
pub mod measure;

pub use codepoint::{decode_at, Codepoints, DecodedCodepoint};
pub use measure::{
    draw_text, glyph_rects, measure_string, text_bounds, x_advance, DrawParams, GlyphColors,
    TextMeasure,
};

/// Encode a Rust string as the UTF-16 units layout operates on.
pub fn utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}
