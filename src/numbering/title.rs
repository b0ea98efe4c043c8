//! Title stripping and composition.

// ============================================================================
// Imports
// ============================================================================

use super::glyph::{Capacity, glyph_at, is_glyph};

// ============================================================================
// Composition
// ============================================================================

/// Removes one leading glyph from `title`, if present.
#[must_use]
pub fn strip_glyph(title: &str) -> &str {
    let mut chars = title.chars();
    match chars.next() {
        Some(first) if is_glyph(first) => chars.as_str(),
        _ => title,
    }
}

/// Computes the numbered title for a tab at `index`.
///
/// Any existing glyph is stripped first, so composing an already
/// composed title yields the same string. Tabs at or beyond
/// `capacity` get the bare title back.
#[must_use]
pub fn compose_title(title: &str, index: usize, capacity: Capacity) -> String {
    let bare = strip_glyph(title);

    match glyph_at(index).filter(|_| capacity.contains(index)) {
        Some(glyph) => {
            let mut composed = String::with_capacity(bare.len() + glyph.len_utf8());
            composed.push(glyph);
            composed.push_str(bare);
            composed
        }
        None => bare.to_string(),
    }
}

/// Returns the title a tab should be given, or `None` when nothing
/// needs to change.
///
/// `None` covers both an absent/empty title (nothing to number yet)
/// and a title that is already correct.
#[must_use]
pub fn renumber(title: Option<&str>, index: usize, capacity: Capacity) -> Option<String> {
    let current = title.filter(|t| !t.is_empty())?;
    let composed = compose_title(current, index, capacity);
    (composed != current).then_some(composed)
}

// ============================================================================
// Tests
// ============================================================================
