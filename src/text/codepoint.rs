//! UTF-16 codepoint decoding.
//!
//! Text is held as UTF-16 code units so that indices line up with the
//! cursor positions of the editors and UI toolkits feeding it. Decoding is
//! permissive: a surrogate that is not part of a valid pair decodes to its
//! own 16-bit value instead of failing.

const HIGH_SURROGATE_START: u16 = 0xD800;
const HIGH_SURROGATE_END: u16 = 0xDBFF;
const LOW_SURROGATE_START: u16 = 0xDC00;
const LOW_SURROGATE_END: u16 = 0xDFFF;

fn is_high_surrogate(unit: u16) -> bool {
    (HIGH_SURROGATE_START..=HIGH_SURROGATE_END).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (LOW_SURROGATE_START..=LOW_SURROGATE_END).contains(&unit)
}

/// Whether `units[index]` and `units[index + 1]` form a surrogate pair.
pub fn is_surrogate_pair(units: &[u16], index: usize) -> bool {
    match (units.get(index), units.get(index + 1)) {
        (Some(&high), Some(&low)) => is_high_surrogate(high) && is_low_surrogate(low),
        _ => false,
    }
}

/// Decode the codepoint starting at `index`.
///
/// Returns the codepoint and the number of code units it occupies (1 or 2),
/// or `None` when `index` is past the end.
pub fn decode_at(units: &[u16], index: usize) -> Option<(u32, usize)> {
    let unit = *units.get(index)?;
    if is_surrogate_pair(units, index) {
        let low = units[index + 1];
        let cp = 0x10000
            + (((unit - HIGH_SURROGATE_START) as u32) << 10)
            + (low - LOW_SURROGATE_START) as u32;
        return Some((cp, 2));
    }
    Some((unit as u32, 1))
}

/// One decoded codepoint and where it sits in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedCodepoint {
    /// Code unit index of the first unit.
    pub index: usize,
    /// Number of code units consumed (1 or 2).
    pub len: usize,
    pub codepoint: u32,
}

/// Lazy iterator over the codepoints of a UTF-16 buffer.
///
/// Restarting is creating a new iterator; the only state is the cursor.
#[derive(Debug, Clone)]
pub struct Codepoints<'a> {
    units: &'a [u16],
    cursor: usize,
}

impl<'a> Codepoints<'a> {
    pub fn new(units: &'a [u16]) -> Self {
        Self::starting_at(units, 0)
    }

    pub fn starting_at(units: &'a [u16], index: usize) -> Self {
        Self {
            units,
            cursor: index,
        }
    }
}

impl Iterator for Codepoints<'_> {
    type Item = DecodedCodepoint;

    fn next(&mut self) -> Option<DecodedCodepoint> {
        let (codepoint, len) = decode_at(self.units, self.cursor)?;
        let item = DecodedCodepoint {
            index: self.cursor,
            len,
            codepoint,
        };
        self.cursor += len;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.units.len().saturating_sub(self.cursor);
        (remaining.div_ceil(2), Some(remaining))
    }
}

impl std::iter::FusedIterator for Codepoints<'_> {}

/// Whether a codepoint is whitespace for word-wrap purposes.
///
/// Isolated surrogates and other non-scalar values are never whitespace.
pub fn is_whitespace(codepoint: u32) -> bool {
    char::from_u32(codepoint).is_some_and(char::is_whitespace)
}
