//! Inline markup commands.
//!
//! Commands start with `/` and never occupy width:
//!
//! - `/c[red]`, `/c[#ff8800]`: color following text
//! - `/cd`: back to the default color
//! - `/v[4]`: shift following text down by 4 pixels within its line
//! - `/vd`: no vertical shift
//! - `/n`: hard line break
//!
//! A `/` that does not begin a well-formed command is ordinary text.

use crate::style::Color;

pub const INTRODUCER: u16 = b'/' as u16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Color(Color),
    ResetColor,
    VerticalOffset(f32),
    ResetVerticalOffset,
    LineBreak,
}

fn unit_is(units: &[u16], index: usize, ascii: u8) -> bool {
    units.get(index) == Some(&(ascii as u16))
}

/// Longest argument between brackets, in code units.
pub const MAX_ARGUMENT: usize = 32;

/// Text between `[` at `open` and the closing `]`, with the index past `]`.
///
/// The argument may not contain whitespace, `/` or `[`, and may not exceed
/// [`MAX_ARGUMENT`] units, so an unclosed bracket costs a bounded scan.
fn bracketed(units: &[u16], open: usize) -> Option<(String, usize)> {
    if !unit_is(units, open, b'[') {
        return None;
    }
    let start = open + 1;
    let close = units
        .get(start..)?
        .iter()
        .take(MAX_ARGUMENT + 1)
        .take_while(|&&u| !matches!(u, 0x2F | 0x5B) && !is_space(u))
        .position(|&u| u == b']' as u16)
        .map(|p| start + p)?;
    Some((String::from_utf16_lossy(&units[start..close]), close + 1))
}

fn is_space(unit: u16) -> bool {
    char::from_u32(unit as u32).is_some_and(char::is_whitespace)
}

/// Parse a command at `index`, returning it with the code units it spans.
pub fn parse(units: &[u16], index: usize) -> Option<(Command, usize)> {
    if !unit_is(units, index, b'/') {
        return None;
    }

    let (command, end) = if unit_is(units, index + 1, b'c') {
        if unit_is(units, index + 2, b'd') {
            (Command::ResetColor, index + 3)
        } else {
            let (arg, end) = bracketed(units, index + 2)?;
            (Command::Color(Color::parse(&arg)?), end)
        }
    } else if unit_is(units, index + 1, b'v') {
        if unit_is(units, index + 2, b'd') {
            (Command::ResetVerticalOffset, index + 3)
        } else {
            let (arg, end) = bracketed(units, index + 2)?;
            let offset: f32 = arg.trim().parse().ok()?;
            if !offset.is_finite() {
                return None;
            }
            (Command::VerticalOffset(offset), end)
        }
    } else if unit_is(units, index + 1, b'n') {
        (Command::LineBreak, index + 2)
    } else {
        return None;
    };

    Some((command, end - index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(s: &str) -> Option<(Command, usize)> {
        let units: Vec<u16> = s.encode_utf16().collect();
        parse(&units, 0)
    }

    #[test]
    fn test_color_commands() {
        assert_eq!(
            parse_str("/c[red]rest"),
            Some((Command::Color(Color::rgb(1.0, 0.0, 0.0)), 7))
        );
        assert_eq!(
            parse_str("/c[#00f]"),
            Some((Command::Color(Color::rgb(0.0, 0.0, 1.0)), 8))
        );
        assert_eq!(parse_str("/cdx"), Some((Command::ResetColor, 3)));
    }

    #[test]
    fn test_vertical_offset_and_line_break() {
        assert_eq!(
            parse_str("/v[-3.5]"),
            Some((Command::VerticalOffset(-3.5), 8))
        );
        assert_eq!(parse_str("/vd"), Some((Command::ResetVerticalOffset, 3)));
        assert_eq!(parse_str("/n"), Some((Command::LineBreak, 2)));
    }

    #[test]
    fn test_malformed_is_plain_text() {
        assert_eq!(parse_str("/"), None);
        assert_eq!(parse_str("/x"), None);
        assert_eq!(parse_str("/c[red"), None);
        assert_eq!(parse_str("/c[nope]"), None);
        assert_eq!(parse_str("/v[wide]"), None);
        assert_eq!(parse_str("a/n"), None);
        assert_eq!(parse_str("/c[red /c[blue]"), None);
        assert_eq!(parse_str("/v[1\n]"), None);
    }

    #[test]
    fn test_argument_length_is_bounded() {
        let long = format!("/c[#{}]", "f".repeat(MAX_ARGUMENT));
        assert_eq!(parse_str(&long), None);
        let fits = format!("/v[{}1]", "0".repeat(MAX_ARGUMENT - 1));
        assert_eq!(parse_str(&fits), Some((Command::VerticalOffset(1.0), MAX_ARGUMENT + 4)));
    }
}
