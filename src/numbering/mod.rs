//! Tab number glyphs and title composition.
//!
//! Pure functions only: nothing here talks to a host. The
//! [`TabNumberer`](crate::TabNumberer) feeds tab snapshots through
//! [`renumber`] and hands the result to [`set_title_script`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `glyph` | Superscript digit table and [`Capacity`] |
//! | `title` | Strip, compose and renumber titles |
//! | `script` | Render the `document.title` assignment |

// ============================================================================
// Submodules
// ============================================================================

mod glyph;
mod script;
mod title;

// ============================================================================
// Re-exports
// ============================================================================

pub use glyph::{Capacity, GLYPHS, glyph_at, is_glyph};
pub use script::{parse_set_title_script, set_title_script};
pub use title::{compose_title, renumber, strip_glyph};
