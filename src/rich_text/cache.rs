//! Memoized layout sizes keyed by wrap width.

use crate::geometry::Size;
use std::collections::HashMap;

/// Cache key for a wrap width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapKey {
    Unconstrained,
    /// Bit pattern of the width, so any float can key the map.
    Width(u32),
}

impl WrapKey {
    pub fn from_width(width: Option<f32>) -> Self {
        match width {
            // -0.0 and 0.0 wrap identically.
            Some(w) if w == 0.0 => WrapKey::Width(0.0f32.to_bits()),
            Some(w) => WrapKey::Width(w.to_bits()),
            None => WrapKey::Unconstrained,
        }
    }
}

/// Sizes produced by earlier layout passes, one per wrap width.
///
/// Entries stay valid until text, font or a geometry option changes, at
/// which point the owner clears the whole cache.
#[derive(Debug, Clone, Default)]
pub struct MeasureCache {
    entries: HashMap<WrapKey, Size>,
}

impl MeasureCache {
    pub fn get(&self, width: Option<f32>) -> Option<Size> {
        self.entries.get(&WrapKey::from_width(width)).copied()
    }

    pub fn insert(&mut self, width: Option<f32>, size: Size) {
        self.entries.insert(WrapKey::from_width(width), size);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_distinguish_unconstrained() {
        assert_ne!(WrapKey::from_width(None), WrapKey::from_width(Some(0.0)));
        assert_eq!(WrapKey::from_width(Some(-0.0)), WrapKey::from_width(Some(0.0)));
    }

    #[test]
    fn test_insert_get_clear() {
        let mut cache = MeasureCache::default();
        cache.insert(Some(40.0), Size::new(40.0, 40.0));
        cache.insert(None, Size::new(88.0, 20.0));
        assert_eq!(cache.get(Some(40.0)), Some(Size::new(40.0, 40.0)));
        assert_eq!(cache.get(Some(41.0)), None);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
