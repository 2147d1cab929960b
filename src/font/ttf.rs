//! TrueType/OpenType metrics via ttf-parser.
//!
//! Only metrics are read here: advances, bounding boxes, vertical metrics and
//! the legacy `kern` table. Rasterization into an atlas stays with the
//! application, so glyphs from this provider carry no atlas slot.

use super::{GlyphMetrics, GlyphMetricsProvider};
use crate::error::LayoutError;
use crate::geometry::Vec2;
use crate::render::TextureManager;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use ttf_parser::{Face, GlyphId};

/// A font file at a fixed pixel size.
pub struct TtfFont {
    data: Vec<u8>,
    face_index: u32,
    font_size: f32,
    /// Pixels per font unit.
    scale: f32,
    ascent: f32,
    line_height: f32,
    has_kerning: bool,
    glyphs: RefCell<HashMap<u32, Option<GlyphMetrics>>>,
    pairs: RefCell<HashMap<(u32, u32), f32>>,
}

impl std::fmt::Debug for TtfFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtfFont")
            .field("bytes", &self.data.len())
            .field("face_index", &self.face_index)
            .field("font_size", &self.font_size)
            .field("ascent", &self.ascent)
            .field("line_height", &self.line_height)
            .field("has_kerning", &self.has_kerning)
            .finish()
    }
}

impl TtfFont {
    /// Parse font data and size it so that one em is `font_size` pixels.
    pub fn from_data(data: Vec<u8>, face_index: u32, font_size: f32) -> Result<Self, LayoutError> {
        let face = Face::parse(&data, face_index)
            .map_err(|e| LayoutError::Font(format!("failed to parse font: {}", e)))?;

        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err(LayoutError::Font("font reports zero units per em".to_string()));
        }
        let scale = font_size / units_per_em as f32;
        let ascender = face.ascender() as f32;
        let descender = face.descender() as f32;
        let line_gap = face.line_gap() as f32;
        let has_kerning = face.tables().kern.is_some();

        log::debug!(
            "loaded font: {} units/em, ascender {}, descender {}, kern table: {}",
            units_per_em,
            ascender,
            descender,
            has_kerning
        );

        Ok(Self {
            face_index,
            font_size,
            scale,
            ascent: (ascender * scale).round(),
            line_height: ((ascender - descender + line_gap) * scale).round(),
            has_kerning,
            glyphs: RefCell::new(HashMap::new()),
            pairs: RefCell::new(HashMap::new()),
            data,
        })
    }

    pub fn from_file(path: impl AsRef<Path>, font_size: f32) -> Result<Self, LayoutError> {
        let data = std::fs::read(path)?;
        Self::from_data(data, 0, font_size)
    }

    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.data, self.face_index).ok()
    }

    fn glyph_id(face: &Face<'_>, codepoint: u32) -> Option<GlyphId> {
        let ch = char::from_u32(codepoint)?;
        if ch.is_control() {
            return None;
        }
        face.glyph_index(ch)
    }

    fn load_glyph(&self, codepoint: u32) -> Option<GlyphMetrics> {
        let face = self.face()?;
        let id = Self::glyph_id(&face, codepoint)?;
        let advance = face.glyph_hor_advance(id).unwrap_or(0) as f32 * self.scale;

        // Whitespace and other outline-less glyphs have no bounding box.
        let (offset, size) = match face.glyph_bounding_box(id) {
            Some(bbox) => (
                Vec2::new(bbox.x_min as f32 * self.scale, -(bbox.y_max as f32) * self.scale),
                Vec2::new(
                    (bbox.x_max as f32 - bbox.x_min as f32) * self.scale,
                    (bbox.y_max as f32 - bbox.y_min as f32) * self.scale,
                ),
            ),
            None => (Vec2::ZERO, Vec2::ZERO),
        };

        Some(GlyphMetrics {
            codepoint,
            advance,
            offset,
            size,
            atlas: None,
        })
    }

    fn load_pair(&self, left: u32, right: u32) -> f32 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let (Some(left), Some(right)) = (
            Self::glyph_id(&face, left),
            Self::glyph_id(&face, right),
        ) else {
            return 0.0;
        };
        let Some(kern) = face.tables().kern else {
            return 0.0;
        };

        kern.subtables
            .into_iter()
            .filter(|subtable| subtable.horizontal && !subtable.variable)
            .find_map(|subtable| subtable.glyphs_kerning(left, right))
            .map(|units| units as f32 * self.scale)
            .unwrap_or(0.0)
    }
}

impl GlyphMetricsProvider for TtfFont {
    fn glyph(
        &self,
        _textures: Option<&dyn TextureManager>,
        codepoint: u32,
    ) -> Option<GlyphMetrics> {
        if let Some(cached) = self.glyphs.borrow().get(&codepoint) {
            return *cached;
        }
        let glyph = self.load_glyph(codepoint);
        self.glyphs.borrow_mut().insert(codepoint, glyph);
        glyph
    }

    fn kerning(&self, left: u32, right: u32) -> f32 {
        if !self.has_kerning {
            return 0.0;
        }
        if let Some(&adjust) = self.pairs.borrow().get(&(left, right)) {
            return adjust;
        }
        let adjust = self.load_pair(left, right);
        self.pairs.borrow_mut().insert((left, right), adjust);
        adjust
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_data_is_font_error() {
        let err = TtfFont::from_data(vec![0u8; 16], 0, 12.0).unwrap_err();
        assert!(matches!(err, LayoutError::Font(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TtfFont::from_file("/nonexistent/font.ttf", 12.0).unwrap_err();
        assert!(matches!(err, LayoutError::Io(_)));
    }

    fn be16(out: &mut Vec<u8>, v: u16) {
        out.extend_from_slice(&v.to_be_bytes());
    }

    fn be32(out: &mut Vec<u8>, v: u32) {
        out.extend_from_slice(&v.to_be_bytes());
    }

    /// Glyph id of an uppercase letter in [`tiny_font`].
    fn gid(ch: char) -> u16 {
        ch as u16 - 'A' as u16 + 1
    }

    /// A minimal TrueType font: 1000 units/em, `A`..`Z` mapped to glyphs
    /// 1..26 with 600-unit advances, and one kerning pair `A V` = -80.
    fn tiny_font() -> Vec<u8> {
        let num_glyphs: u16 = 27;

        let mut head = Vec::new();
        be32(&mut head, 0x0001_0000); // version
        be32(&mut head, 0x0001_0000); // fontRevision
        be32(&mut head, 0); // checksumAdjustment
        be32(&mut head, 0x5F0F_3CF5); // magic
        be16(&mut head, 0); // flags
        be16(&mut head, 1000); // unitsPerEm
        head.extend_from_slice(&[0; 16]); // created, modified
        head.extend_from_slice(&[0; 8]); // bbox
        be16(&mut head, 0); // macStyle
        be16(&mut head, 8); // lowestRecPPEM
        be16(&mut head, 2); // fontDirectionHint
        be16(&mut head, 0); // indexToLocFormat
        be16(&mut head, 0); // glyphDataFormat

        let mut hhea = Vec::new();
        be32(&mut hhea, 0x0001_0000);
        be16(&mut hhea, 800); // ascender
        be16(&mut hhea, (-200i16) as u16); // descender
        be16(&mut hhea, 0); // lineGap
        be16(&mut hhea, 600); // advanceWidthMax
        hhea.extend_from_slice(&[0; 22]);
        be16(&mut hhea, num_glyphs); // numberOfHMetrics

        let mut maxp = Vec::new();
        be32(&mut maxp, 0x0000_5000);
        be16(&mut maxp, num_glyphs);

        let mut hmtx = Vec::new();
        for _ in 0..num_glyphs {
            be16(&mut hmtx, 600);
            be16(&mut hmtx, 0);
        }

        // Format 12 subtable, Windows full Unicode.
        let mut cmap = Vec::new();
        be16(&mut cmap, 0);
        be16(&mut cmap, 1);
        be16(&mut cmap, 3);
        be16(&mut cmap, 10);
        be32(&mut cmap, 12);
        be16(&mut cmap, 12);
        be16(&mut cmap, 0);
        be32(&mut cmap, 28); // length
        be32(&mut cmap, 0); // language
        be32(&mut cmap, 1); // numGroups
        be32(&mut cmap, 'A' as u32);
        be32(&mut cmap, 'Z' as u32);
        be32(&mut cmap, 1);

        let mut kern = Vec::new();
        be16(&mut kern, 0); // version
        be16(&mut kern, 1); // nTables
        be16(&mut kern, 0); // subtable version
        be16(&mut kern, 20); // subtable length
        be16(&mut kern, 0x0001); // format 0, horizontal
        be16(&mut kern, 1); // nPairs
        be16(&mut kern, 6); // searchRange
        be16(&mut kern, 0); // entrySelector
        be16(&mut kern, 0); // rangeShift
        be16(&mut kern, gid('A'));
        be16(&mut kern, gid('V'));
        be16(&mut kern, (-80i16) as u16);

        // Table records must be sorted by tag.
        let tables: [(&[u8; 4], Vec<u8>); 6] = [
            (b"cmap", cmap),
            (b"head", head),
            (b"hhea", hhea),
            (b"hmtx", hmtx),
            (b"kern", kern),
            (b"maxp", maxp),
        ];

        let mut font = Vec::new();
        be32(&mut font, 0x0001_0000);
        be16(&mut font, tables.len() as u16);
        be16(&mut font, 64); // searchRange
        be16(&mut font, 2); // entrySelector
        be16(&mut font, 32); // rangeShift

        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            font.extend_from_slice(*tag);
            be32(&mut font, 0);
            be32(&mut font, offset as u32);
            be32(&mut font, data.len() as u32);
            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }
        font.extend_from_slice(&body);
        font
    }

    #[test]
    fn test_tiny_font_metrics() {
        let font = TtfFont::from_data(tiny_font(), 0, 100.0).unwrap();
        assert_eq!(font.ascent(), 80.0);
        assert_eq!(font.line_height(), 100.0);
        let a = font.glyph(None, 'A' as u32).unwrap();
        assert!((a.advance - 60.0).abs() < 1e-3);
        assert!(font.glyph(None, 'a' as u32).is_none());
    }

    #[test]
    fn test_kern_pairs_from_table() {
        let font = TtfFont::from_data(tiny_font(), 0, 100.0).unwrap();
        assert!((font.kerning('A' as u32, 'V' as u32) + 8.0).abs() < 1e-3);
        // Cached lookups return the same value.
        assert!((font.kerning('A' as u32, 'V' as u32) + 8.0).abs() < 1e-3);
        assert_eq!(font.kerning('V' as u32, 'A' as u32), 0.0);
        assert_eq!(font.kerning('A' as u32, 'a' as u32), 0.0);
    }

    #[test]
    fn test_kerning_narrows_layout() {
        use crate::layout::LayoutBuilder;

        let font = TtfFont::from_data(tiny_font(), 0, 100.0).unwrap();
        let builder = LayoutBuilder::default();
        let kerned = builder.layout(&crate::text::utf16("AV"), &font, None);
        let plain = builder.layout(&crate::text::utf16("VA"), &font, None);
        assert!((kerned.size.width - 112.0).abs() < 1e-3);
        assert!((plain.size.width - 120.0).abs() < 1e-3);
    }
}
