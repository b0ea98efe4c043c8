//! Superscript digit glyphs and numbering capacity.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Glyphs for tab positions 0 through 8, in order.
///
/// Positions map to the browser's `Ctrl+1` .. `Ctrl+9` shortcuts.
pub const GLYPHS: [char; 9] = ['¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Returns `true` if `c` is one of the numbering glyphs.
#[inline]
#[must_use]
pub fn is_glyph(c: char) -> bool {
    GLYPHS.contains(&c)
}

/// Returns the glyph for a zero-based position, if one exists.
#[inline]
#[must_use]
pub fn glyph_at(index: usize) -> Option<char> {
    GLYPHS.get(index).copied()
}

// ============================================================================
// Capacity
// ============================================================================

/// Number of tab positions that receive a glyph.
///
/// Firefox reserves its ninth shortcut for "last tab", so only eight
/// positions are numbered there; Chromium-family browsers number nine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capacity(u8);

impl Capacity {
    /// Capacity for Firefox-family hosts.
    pub const FIREFOX: Self = Self(8);

    /// Capacity for Chromium-family hosts.
    pub const CHROMIUM: Self = Self(9);

    /// Creates a capacity, rejecting values outside `1..=9`.
    #[must_use]
    pub const fn new(slots: u8) -> Option<Self> {
        if slots == 0 || slots as usize > GLYPHS.len() {
            None
        } else {
            Some(Self(slots))
        }
    }

    /// Returns the number of numbered positions.
    #[inline]
    #[must_use]
    pub const fn slots(&self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if `index` falls inside the numbered range.
    #[inline]
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index < self.slots()
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
