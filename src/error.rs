//! Structured error types for glyphflow.
//!
//! Text itself never produces an error: malformed UTF-16 decodes permissively
//! and unsupported codepoints are skipped. What remains are configuration
//! mistakes (a renderer without a texture manager, an unknown option), font
//! loading failures, and job parsing in the CLI.

use thiserror::Error;

/// The unified error type returned by fallible glyphflow APIs.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The renderer passed to a draw call exposes no texture manager.
    #[error("renderer has no texture manager; nothing can be drawn")]
    MissingTextureManager,

    /// Per-glyph colors were given for fewer codepoints than the text has.
    #[error("{given} colors given for {needed} codepoints")]
    ColorCount { needed: usize, given: usize },

    /// An option name was not recognized or its value did not parse.
    #[error("invalid layout option `{name}` = `{value}`")]
    InvalidOption { name: String, value: String },

    /// Font data could not be loaded or parsed.
    #[error("font error: {0}")]
    Font(String),

    /// A layout job failed to parse as JSON.
    #[error("failed to parse layout job: {source}{}", fmt_hint(.hint))]
    ParseError {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A layout report could not be written as JSON.
    #[error("failed to serialize layout report: {0}")]
    Report(#[source] serde_json::Error),

    /// Reading a job or font file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn fmt_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for LayoutError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the layout job schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        LayoutError::ParseError { source: e, hint }
    }
}
