//! Event message types.
//!
//! Events are notifications sent from the extension when the browser
//! reports tab lifecycle activity. Each `browser.tabs.on*` listener in the
//! extension forwards its arguments as one event.
//!
//! # Event Types
//!
//! | Method | Params |
//! |--------|--------|
//! | `tabs.created` | `tab` |
//! | `tabs.attached` | `tabId`, `newWindowId`, `newPosition` |
//! | `tabs.moved` | `tabId`, `windowId`, `fromIndex`, `toIndex` |
//! | `tabs.removed` | `tabId`, `windowId`, `isWindowClosing` |
//! | `tabs.updated` | `tabId`, `changeInfo`, `tab` |

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::host::TabSnapshot;
use crate::identifiers::{RequestId, TabId, WindowId};

// ============================================================================
// Event
// ============================================================================

/// An event notification from the extension.
///
/// # Format
///
/// ```json
/// {
///   "id": "event-uuid",
///   "type": "event",
///   "method": "tabs.eventName",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Unique identifier of the event.
    pub id: RequestId,

    /// Event type marker (always "event").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event name in `tabs.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Parses the event into a typed [`TabEvent`].
    #[must_use]
    pub fn parse(&self) -> TabEvent {
        self.parse_internal()
    }
}

// ============================================================================
// TabEvent
// ============================================================================

/// Tab lifecycle events, one per host listener.
#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
    /// A tab was opened.
    Created {
        /// The new tab.
        tab: TabSnapshot,
    },

    /// A tab was attached to a window, typically after a drag between windows.
    Attached {
        /// Tab ID.
        tab_id: TabId,
        /// Window the tab joined.
        new_window_id: WindowId,
        /// Index in the new window.
        new_position: usize,
    },

    /// A tab moved within its window.
    Moved {
        /// Tab ID.
        tab_id: TabId,
        /// Window containing the tab.
        window_id: WindowId,
        /// Previous index.
        from_index: usize,
        /// New index.
        to_index: usize,
    },

    /// A tab was closed.
    ///
    /// The host may still list the tab for a short while afterwards.
    Removed {
        /// Tab ID.
        tab_id: TabId,
        /// Window the tab belonged to.
        window_id: WindowId,
        /// Whether the whole window is closing.
        is_window_closing: bool,
    },

    /// A tab's properties (title, status, ...) changed.
    Updated {
        /// Tab ID.
        tab_id: TabId,
        /// Tab state after the change.
        tab: TabSnapshot,
    },

    /// Unknown or malformed event.
    Unknown {
        /// Event method.
        method: String,
        /// Event params.
        params: Value,
    },
}

impl TabEvent {
    /// Returns the wire method name of this event.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Created { .. } => "tabs.created",
            Self::Attached { .. } => "tabs.attached",
            Self::Moved { .. } => "tabs.moved",
            Self::Removed { .. } => "tabs.removed",
            Self::Updated { .. } => "tabs.updated",
            Self::Unknown { method, .. } => method,
        }
    }
}

// ============================================================================
// Event Parsing Implementation
// ============================================================================

impl Event {
    /// Internal parsing implementation.
    ///
    /// A missing or out-of-range field yields [`TabEvent::Unknown`].
    fn parse_internal(&self) -> TabEvent {
        let parsed = match self.method.as_str() {
            "tabs.created" => self.get_tab().map(|tab| TabEvent::Created { tab }),
            "tabs.attached" => self.parse_attached(),
            "tabs.moved" => self.parse_moved(),
            "tabs.removed" => self.parse_removed(),
            "tabs.updated" => self.parse_updated(),
            _ => None,
        };

        parsed.unwrap_or_else(|| TabEvent::Unknown {
            method: self.method.clone(),
            params: self.params.clone(),
        })
    }

    fn parse_attached(&self) -> Option<TabEvent> {
        Some(TabEvent::Attached {
            tab_id: TabId::new(self.get_u32("tabId")?),
            new_window_id: WindowId::new(self.get_u32("newWindowId")?),
            new_position: self.get_usize("newPosition")?,
        })
    }

    fn parse_moved(&self) -> Option<TabEvent> {
        Some(TabEvent::Moved {
            tab_id: TabId::new(self.get_u32("tabId")?),
            window_id: WindowId::new(self.get_u32("windowId")?),
            from_index: self.get_usize("fromIndex")?,
            to_index: self.get_usize("toIndex")?,
        })
    }

    fn parse_removed(&self) -> Option<TabEvent> {
        Some(TabEvent::Removed {
            tab_id: TabId::new(self.get_u32("tabId")?),
            window_id: WindowId::new(self.get_u32("windowId")?),
            is_window_closing: self.get_bool("isWindowClosing"),
        })
    }

    fn parse_updated(&self) -> Option<TabEvent> {
        Some(TabEvent::Updated {
            tab_id: TabId::new(self.get_u32("tabId")?),
            tab: self.get_tab()?,
        })
    }

    /// Gets the `tab` object from params.
    #[inline]
    fn get_tab(&self) -> Option<TabSnapshot> {
        self.params
            .get("tab")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Gets a u32 from params, `None` if absent or out of range.
    #[inline]
    fn get_u32(&self, key: &str) -> Option<u32> {
        self.params
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }

    /// Gets a usize from params, `None` if absent or out of range.
    #[inline]
    fn get_usize(&self, key: &str) -> Option<usize> {
        self.params
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }

    /// Gets a bool from params. Absent means `false`.
    /// Gets a bool from params.
    #[inline]
    fn get_bool(&self, key: &str) -> bool {
        self.params
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn event(method: &str, params: &str) -> Event {
        let json_str = format!(
            r#"{{
                "id": "550e8400-e29b-41d4-a716-446655440000",
                "type": "event",
                "method": "{method}",
                "params": {params}
            }}"#
        );
        serde_json::from_str(&json_str).expect("parse event")
    }

    #[test]
    fn test_removed_parsing() {
        let event = event(
            "tabs.removed",
            r#"{ "tabId": 17, "windowId": 2, "isWindowClosing": false }"#,
        );
        assert_eq!(
            event.parse(),
            TabEvent::Removed {
                tab_id: TabId::new(17),
                window_id: WindowId::new(2),
                is_window_closing: false,
            }
        );
    }

    #[test]
    fn test_updated_parsing() {
        let event = event(
            "tabs.updated",
            r#"{
                "tabId": 5,
                "changeInfo": { "title": "Inbox (3)" },
                "tab": { "id": 5, "index": 1, "windowId": 1, "title": "Inbox (3)" }
            }"#,
        );

        match event.parse() {
            TabEvent::Updated { tab_id, tab } => {
                assert_eq!(tab_id, TabId::new(5));
                assert_eq!(tab.index, 1);
                assert_eq!(tab.title.as_deref(), Some("Inbox (3)"));
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_moved_parsing() {
        let event = event(
            "tabs.moved",
            r#"{ "tabId": 3, "windowId": 1, "fromIndex": 0, "toIndex": 4 }"#,
        );

        assert_eq!(
            event.parse(),
            TabEvent::Moved {
                tab_id: TabId::new(3),
                window_id: WindowId::new(1),
                from_index: 0,
                to_index: 4,
            }
        );
    }

    #[test]
    fn test_attached_parsing() {
        let event = event(
            "tabs.attached",
            r#"{ "tabId": 8, "newWindowId": 3, "newPosition": 2 }"#,
        );

        assert_eq!(
            event.parse(),
            TabEvent::Attached {
                tab_id: TabId::new(8),
                new_window_id: WindowId::new(3),
                new_position: 2,
            }
        );
    }

    #[test]
    fn test_removed_without_tab_id_is_unknown() {
        let event = event("tabs.removed", r#"{ "windowId": 2, "isWindowClosing": false }"#);
        assert!(matches!(event.parse(), TabEvent::Unknown { .. }));
    }

    #[test]
    fn test_out_of_range_tab_id_is_unknown() {
        let event = event(
            "tabs.moved",
            r#"{ "tabId": 4294967296, "windowId": 1, "fromIndex": 0, "toIndex": 1 }"#,
        );
        assert!(matches!(event.parse(), TabEvent::Unknown { .. }));
    }

    #[test]
    fn test_created_without_tab_is_unknown() {
        let event = event("tabs.created", r#"{}"#);
        assert!(matches!(event.parse(), TabEvent::Unknown { .. }));
    }

    #[test]
    fn test_unknown_event() {
        let event = event("tabs.activated", r#"{ "tabId": 1 }"#);

        match event.parse() {
            TabEvent::Unknown { method, .. } => assert_eq!(method, "tabs.activated"),
            other => panic!("expected Unknown variant, got {other:?}"),
        }
    }
}
