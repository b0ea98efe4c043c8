//! Type-safe identifiers for host entities.
//!
//! Newtype wrappers prevent passing a window ID where a tab ID is
//! expected, and keep request correlation IDs distinct from both.
//!
//! | Type | Wraps | Source |
//! |------|-------|--------|
//! | [`TabId`] | `u32` | Browser `tabs.Tab.id` |
//! | [`WindowId`] | `u32` | Browser `windows.Window.id` |
//! | [`RequestId`] | `Uuid` | Generated per request |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// TabId
// ============================================================================

/// Identifier of a browser tab.
///
/// Stable for the lifetime of the tab, unlike its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u32);

impl TabId {
    /// Creates a tab ID from the raw browser value.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw browser value.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TabId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ============================================================================
// WindowId
// ============================================================================

/// Identifier of a browser window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u32);

impl WindowId {
    /// Creates a window ID from the raw browser value.
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw browser value.
    #[inline]
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// RequestId
// ============================================================================

/// Correlation ID for a request/response pair.
///
/// The nil UUID is reserved for the READY handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the reserved READY handshake ID (nil UUID).
    #[inline]
    #[must_use]
    pub const fn ready() -> Self {
        Self(Uuid::nil())
    }

    /// Returns `true` if this is the READY handshake ID.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_id_serializes_as_number() {
        let json = serde_json::to_string(&TabId::new(42)).expect("serialize");
        assert_eq!(json, "42");

        let parsed: TabId = serde_json::from_str("7").expect("deserialize");
        assert_eq!(parsed, TabId::new(7));
    }

    #[test]
    fn test_request_id_ready_is_nil() {
        assert!(RequestId::ready().is_ready());
        assert!(!RequestId::generate().is_ready());
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[test]
    fn test_display() {
        assert_eq!(TabId::new(3).to_string(), "3");
        assert_eq!(WindowId::new(9).to_string(), "9");
        assert_eq!(TabId::from(12).as_u32(), 12);
    }
}
