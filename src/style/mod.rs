//! # Style
//!
//! Inline style carried by text chunks. Today that is only color; the color
//! command of the markup sets it and draw calls resolve it against the base
//! color passed by the caller.

use serde::{Deserialize, Serialize};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Lenient hex parse: a malformed channel reads as zero, an unknown
    /// length as black.
    pub fn hex(hex: &str) -> Self {
        match Self::hex_channels(hex) {
            Some(channels) => {
                Self::from_channels(channels.iter().map(|c| Self::channel(c).unwrap_or(0.0)))
            }
            None => Color::BLACK,
        }
    }

    /// Strict `#rgb`, `#rrggbb` or `#rrggbbaa`.
    fn parse_hex(hex: &str) -> Option<Self> {
        let values = Self::hex_channels(hex)?
            .iter()
            .map(|c| Self::channel(c))
            .collect::<Option<Vec<f64>>>()?;
        Some(Self::from_channels(values))
    }

    /// Two-digit channel strings, shorthand digits doubled.
    fn hex_channels(hex: &str) -> Option<Vec<String>> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => Some(hex.chars().map(|c| c.to_string().repeat(2)).collect()),
            6 | 8 => Some(
                (0..hex.len())
                    .step_by(2)
                    .map(|i| hex[i..i + 2].to_string())
                    .collect(),
            ),
            _ => None,
        }
    }

    fn channel(digits: &str) -> Option<f64> {
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u8::from_str_radix(digits, 16).ok().map(|v| v as f64 / 255.0)
    }

    /// Channels in `r g b a` order; alpha defaults to opaque.
    fn from_channels(channels: impl IntoIterator<Item = f64>) -> Self {
        let mut channels = channels.into_iter();
        let mut next = |default: f64| channels.next().unwrap_or(default);
        Self {
            r: next(0.0),
            g: next(0.0),
            b: next(0.0),
            a: next(1.0),
        }
    }

    /// Resolve a color command argument: a `#hex` literal or a CSS-style
    /// basic color name (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::parse_hex(value);
        }
        let named = match value.to_ascii_lowercase().as_str() {
            "black" => Color::BLACK,
            "white" => Color::WHITE,
            "transparent" => Color::TRANSPARENT,
            "red" => Color::rgb(1.0, 0.0, 0.0),
            "green" => Color::rgb(0.0, 128.0 / 255.0, 0.0),
            "lime" => Color::rgb(0.0, 1.0, 0.0),
            "blue" => Color::rgb(0.0, 0.0, 1.0),
            "yellow" => Color::rgb(1.0, 1.0, 0.0),
            "cyan" | "aqua" => Color::rgb(0.0, 1.0, 1.0),
            "magenta" | "fuchsia" => Color::rgb(1.0, 0.0, 1.0),
            "gray" | "grey" => Color::rgb(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0),
            "orange" => Color::rgb(1.0, 165.0 / 255.0, 0.0),
            "purple" => Color::rgb(128.0 / 255.0, 0.0, 128.0 / 255.0),
            _ => return None,
        };
        Some(named)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_short_and_long() {
        assert_eq!(Color::hex("#fff"), Color::WHITE);
        assert_eq!(Color::hex("000000"), Color::BLACK);
        let c = Color::hex("#ff000080");
        assert_eq!(c.r, 1.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_hex_malformed_channel_reads_zero() {
        assert_eq!(Color::hex("#ff00zz"), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::hex("#f0z"), Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::hex("#12"), Color::BLACK);
        assert_eq!(Color::parse("#ff00zz"), None);
        assert_eq!(Color::parse("#+f0000"), None);
    }

    #[test]
    fn test_named_colors_case_insensitive() {
        assert_eq!(Color::parse("Red"), Some(Color::rgb(1.0, 0.0, 0.0)));
        assert_eq!(Color::parse("GREY"), Color::parse("gray"));
    }

    #[test]
    fn test_unknown_color_is_none() {
        assert_eq!(Color::parse("blurple"), None);
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
    }
}
