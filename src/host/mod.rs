//! Host browser abstraction.
//!
//! The numberer never reaches for ambient browser globals. Instead it is
//! handed a [`TabHost`], an explicit client object exposing the three
//! capabilities numbering needs:
//!
//! | Capability | Method |
//! |------------|--------|
//! | Enumerate tabs | [`TabHost::query_tabs`] |
//! | Run code in a page | [`TabHost::execute_script`] |
//! | Identify the browser family | [`TabHost::family`] |
//!
//! # Implementations
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RemoteHost`] | Relays calls to the companion extension over WebSocket |
//! | [`MemoryHost`] | In-process tab list, for tests and embedding |

// ============================================================================
// Submodules
// ============================================================================

/// In-process host.
pub mod memory;

/// WebSocket-backed host.
pub mod remote;

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identifiers::{TabId, WindowId};
use crate::numbering::Capacity;

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::MemoryHost;
pub use remote::RemoteHost;

// ============================================================================
// TabSnapshot
// ============================================================================

/// A point-in-time view of a host tab.
///
/// Mirrors the subset of `tabs.Tab` that numbering reads. Unknown fields
/// sent by the browser are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSnapshot {
    /// Stable tab identifier.
    pub id: TabId,

    /// Zero-based position within the tab's window.
    pub index: usize,

    /// Page title, absent until the page provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Window containing the tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
}

impl TabSnapshot {
    /// Creates a snapshot with a title and no window.
    #[must_use]
    pub fn new(id: TabId, index: usize, title: impl Into<String>) -> Self {
        Self {
            id,
            index,
            title: Some(title.into()),
            window_id: None,
        }
    }

    /// Creates a snapshot for a tab whose page has no title yet.
    #[must_use]
    pub fn untitled(id: TabId, index: usize) -> Self {
        Self {
            id,
            index,
            title: None,
            window_id: None,
        }
    }
}

// ============================================================================
// TabQuery
// ============================================================================

/// Filter for [`TabHost::query_tabs`].
///
/// Numbering always queries every tab; serializes to `{}` in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    /// Restrict to one window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<WindowId>,
}

impl TabQuery {
    /// Matches every open tab in every window.
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self { window_id: None }
    }

    /// Matches tabs in a single window.
    #[inline]
    #[must_use]
    pub const fn window(window_id: WindowId) -> Self {
        Self {
            window_id: Some(window_id),
        }
    }

    /// Returns `true` if `tab` passes this filter.
    #[inline]
    #[must_use]
    pub fn matches(&self, tab: &TabSnapshot) -> bool {
        self.window_id.is_none() || self.window_id == tab.window_id
    }
}

// ============================================================================
// HostFamily
// ============================================================================

/// Browser family hosting the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostFamily {
    /// Firefox and its derivatives.
    Firefox,
    /// Chrome, Chromium, Edge, Brave and other Chromium-based browsers.
    Chromium,
}

impl HostFamily {
    /// Classifies a browser by the name it reports.
    ///
    /// Anything not recognisably Firefox is treated as Chromium.
    #[must_use]
    pub fn from_browser_name(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("firefox") {
            Self::Firefox
        } else {
            Self::Chromium
        }
    }

    /// Number of tab positions this family can jump to by shortcut.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> Capacity {
        match self {
            Self::Firefox => Capacity::FIREFOX,
            Self::Chromium => Capacity::CHROMIUM,
        }
    }
}

impl fmt::Display for HostFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Firefox => f.write_str("firefox"),
            Self::Chromium => f.write_str("chromium"),
        }
    }
}

// ============================================================================
// TabHost
// ============================================================================

/// Browser capabilities consumed by the numberer.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// Returns the open tabs matching `query`, ordered by index.
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabSnapshot>>;

    /// Runs `code` in the page context of `tab_id`.
    ///
    /// Fails if the tab is gone or the page refuses injection.
    async fn execute_script(&self, tab_id: TabId, code: &str) -> Result<()>;

    /// Returns the browser family of this host.
    fn family(&self) -> HostFamily;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_browser_name() {
        assert_eq!(HostFamily::from_browser_name("Firefox"), HostFamily::Firefox);
        assert_eq!(
            HostFamily::from_browser_name("firefox-developer-edition"),
            HostFamily::Firefox
        );
        assert_eq!(HostFamily::from_browser_name("Chrome"), HostFamily::Chromium);
        assert_eq!(HostFamily::from_browser_name(""), HostFamily::Chromium);
    }

    #[test]
    fn test_family_capacity() {
        assert_eq!(HostFamily::Firefox.capacity().slots(), 8);
        assert_eq!(HostFamily::Chromium.capacity().slots(), 9);
    }

    #[test]
    fn test_snapshot_ignores_unknown_fields() {
        let json = r#"{
            "id": 4, "index": 2, "windowId": 1, "title": "Docs",
            "active": true, "pinned": false, "url": "https://example.com"
        }"#;
        let tab: TabSnapshot = serde_json::from_str(json).expect("parse");
        assert_eq!(tab.id, TabId::new(4));
        assert_eq!(tab.index, 2);
        assert_eq!(tab.window_id, Some(WindowId::new(1)));
        assert_eq!(tab.title.as_deref(), Some("Docs"));
    }

    #[test]
    fn test_snapshot_missing_title() {
        let tab: TabSnapshot = serde_json::from_str(r#"{ "id": 1, "index": 0 }"#).expect("parse");
        assert_eq!(tab.title, None);
    }

    #[test]
    fn test_query_matches() {
        let mut tab = TabSnapshot::new(TabId::new(1), 0, "A");
        tab.window_id = Some(WindowId::new(2));

        assert!(TabQuery::all().matches(&tab));
        assert!(TabQuery::window(WindowId::new(2)).matches(&tab));
        assert!(!TabQuery::window(WindowId::new(3)).matches(&tab));
    }
}
