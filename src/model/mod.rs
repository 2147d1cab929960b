//! # Layout Jobs
//!
//! The JSON input and output of the CLI. A job names a text, a font, an
//! optional wrap width and layout options; running it yields a report with
//! the measured size and every laid-out line.

use crate::error::LayoutError;
use crate::font::{FixedFont, GlyphMetricsProvider, TtfFont};
use crate::geometry::Size;
use crate::layout::{LayoutOption, LayoutOptions, TextLine};
use crate::rich_text::RichTextLayout;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// A text to lay out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutJob {
    pub text: String,

    /// Wrap width in pixels. Absent means unconstrained.
    #[serde(default)]
    pub width: Option<f32>,

    #[serde(default)]
    pub font: FontSpec,

    #[serde(default)]
    pub options: LayoutOptions,
}

/// Where glyph metrics come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FontSpec {
    /// Synthetic monospace metrics.
    #[serde(rename_all = "camelCase")]
    Fixed {
        #[serde(default = "default_advance")]
        advance: f32,
        #[serde(default = "default_line_height")]
        line_height: f32,
        #[serde(default)]
        ascent: Option<f32>,
        /// Nominal size; defaults to the line height.
        #[serde(default)]
        font_size: Option<f32>,
    },
    /// A TrueType/OpenType file on disk, rendered at `size` pixels.
    Ttf { path: String, size: f32 },
}

fn default_advance() -> f32 {
    8.0
}

fn default_line_height() -> f32 {
    20.0
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec::Fixed {
            advance: default_advance(),
            line_height: default_line_height(),
            ascent: None,
            font_size: None,
        }
    }
}

impl FontSpec {
    pub fn load(&self) -> Result<Rc<dyn GlyphMetricsProvider>, LayoutError> {
        match self {
            FontSpec::Fixed {
                advance,
                line_height,
                ascent,
                font_size,
            } => {
                let mut font = FixedFont::new(*advance, *line_height);
                if let Some(ascent) = ascent {
                    font = font.with_ascent(*ascent);
                }
                if let Some(size) = font_size {
                    font = font.with_font_size(*size);
                }
                Ok(Rc::new(font))
            }
            FontSpec::Ttf { path, size } => Ok(Rc::new(TtfFont::from_file(path, *size)?)),
        }
    }
}

/// The result of running a [`LayoutJob`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    pub width: Option<f32>,
    pub font_size: f32,
    pub size: Size,
    pub line_count: usize,
    pub lines: Vec<TextLine>,
}

impl LayoutJob {
    /// Apply `name=value` overrides on top of the job's options.
    pub fn override_options<'a, I>(&mut self, overrides: I) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in overrides {
            self.options.apply(LayoutOption::parse(name, value)?);
        }
        Ok(())
    }

    pub fn run(&self) -> Result<LayoutReport, LayoutError> {
        let font = self.font.load()?;
        let font_size = font.font_size();
        let mut layout = RichTextLayout::new(font)
            .with_options(self.options)
            .with_width(self.width);
        layout.set_text(&self.text);

        let size = layout.size();
        let lines = layout.lines().to_vec();
        Ok(LayoutReport {
            width: self.width,
            font_size,
            size,
            line_count: lines.len(),
            lines,
        })
    }
}

/// Parse a job from JSON and run it.
pub fn layout_json(json: &str) -> Result<LayoutReport, LayoutError> {
    let job: LayoutJob = serde_json::from_str(json)?;
    job.run()
}

/// A sample job exercising wrapping and inline markup.
pub fn example_job_json() -> &'static str {
    r##"{
  "text": "The /c[#cc3333]quick/cd brown fox jumps over the /v[2]lazy/vd dog./nThe end.",
  "width": 160,
  "font": { "type": "Fixed", "advance": 8, "lineHeight": 20 },
  "options": {
    "verticalSpacing": 2,
    "supportsCommands": true,
    "calculateGlyphs": false
  }
}
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_job_runs() {
        let report = layout_json(example_job_json()).unwrap();
        assert!(report.line_count > 1);
        assert!(report.size.width <= 160.0);
        assert_eq!(report.line_count, report.lines.len());
    }

    #[test]
    fn test_minimal_job_uses_default_font() {
        let report = layout_json(r#"{ "text": "Hello world" }"#).unwrap();
        assert_eq!(report.size, Size::new(88.0, 20.0));
        assert_eq!(report.lines[0].chunks.len(), 1);
    }

    #[test]
    fn test_fixed_font_fields_are_camel_case() {
        let job: LayoutJob = serde_json::from_str(
            r#"{ "text": "a", "font": { "type": "Fixed", "lineHeight": 30, "ascent": 24 } }"#,
        )
        .unwrap();
        let report = job.run().unwrap();
        assert_eq!(report.size, Size::new(8.0, 30.0));
        assert_eq!(report.font_size, 30.0);

        let job: LayoutJob = serde_json::from_str(
            r#"{ "text": "a", "font": { "type": "Fixed", "fontSize": 24 } }"#,
        )
        .unwrap();
        let json = serde_json::to_value(job.run().unwrap()).unwrap();
        assert_eq!(json["fontSize"], 24.0);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = layout_json(r#"{ "text": "ab", "width": 8 }"#).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["lineCount"], 2);
        assert_eq!(json["lines"][1]["textStartIndex"], 1);
        assert!(json["lines"][0].get("glyphs").is_none());
    }

    #[test]
    fn test_overrides() {
        let mut job: LayoutJob = serde_json::from_str(r#"{ "text": "a\nb" }"#).unwrap();
        job.override_options([("verticalSpacing", "4")]).unwrap();
        assert_eq!(job.run().unwrap().size.height, 44.0);

        let err = job.override_options([("wrap", "yes")]).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidOption { .. }));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = layout_json(r#"{ "text": 5 }"#).unwrap_err();
        assert!(matches!(err, LayoutError::ParseError { .. }));
    }

    #[test]
    fn test_missing_ttf_is_io_error() {
        let err = layout_json(
            r#"{ "text": "a", "font": { "type": "Ttf", "path": "/nonexistent/font.ttf", "size": 16 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::Io(_)));
    }
}
