//! # Renderer seam
//!
//! glyphflow never rasterizes. Drawing resolves positions, colors and atlas
//! slots, then hands one [`SpriteDraw`] per visible glyph to a
//! [`TextRenderer`] supplied by the embedding application. Each graphics
//! backend is one implementation of this trait.

use crate::geometry::{Rect, Vec2};
use crate::style::Color;

/// Opaque handle to a texture owned by the application's texture manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Where a glyph's pixels live inside a texture atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasSlot {
    pub texture: TextureId,
    pub source: Rect,
}

/// The application's texture store, handed to glyph providers when glyphs
/// are requested for drawing so they can place bitmaps in an atlas.
pub trait TextureManager {
    /// Pixel size of a texture, if it exists.
    fn texture_size(&self, texture: TextureId) -> Option<Vec2>;
}

/// A single textured quad to draw.
///
/// Screen placement follows the sprite-batch convention: the source rect is
/// scaled by `scale`, rotated by `rotation` around `origin` (in unscaled
/// source pixels) and `origin` lands on `position`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteDraw {
    pub texture: TextureId,
    pub position: Vec2,
    pub source: Rect,
    pub color: Color,
    pub rotation: f32,
    pub origin: Vec2,
    pub scale: Vec2,
    pub layer_depth: f32,
}

/// A drawing backend.
pub trait TextRenderer {
    /// The texture manager glyph bitmaps are uploaded to. Drawing fails
    /// before emitting anything when this is `None`.
    fn texture_manager(&self) -> Option<&dyn TextureManager>;

    fn draw(&mut self, sprite: &SpriteDraw);
}
