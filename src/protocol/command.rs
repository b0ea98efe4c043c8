//! Command definitions.
//!
//! Each command maps one-to-one onto a `browser.tabs` call made by the
//! extension on the service's behalf.
//!
//! | Command | Params | Result |
//! |---------|--------|--------|
//! | `tabs.query` | query filter | `{ "tabs": [Tab, ...] }` |
//! | `tabs.executeScript` | `tabId`, `code` | ignored |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::host::TabQuery;
use crate::identifiers::TabId;

// ============================================================================
// Command
// ============================================================================

/// Commands understood by the extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Command {
    /// Enumerate tabs matching a filter.
    #[serde(rename = "tabs.query")]
    Query(TabQuery),

    /// Run code in a tab's page context.
    #[serde(rename = "tabs.executeScript")]
    ExecuteScript {
        /// Target tab.
        #[serde(rename = "tabId")]
        tab_id: TabId,
        /// Code to execute.
        code: String,
    },
}

impl Command {
    /// Returns the wire method name.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Query(_) => "tabs.query",
            Self::ExecuteScript { .. } => "tabs.executeScript",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::identifiers::WindowId;

    #[test]
    fn test_query_all_serializes_empty_params() {
        let value = serde_json::to_value(Command::Query(TabQuery::all())).expect("serialize");
        assert_eq!(value, json!({ "method": "tabs.query", "params": {} }));
    }

    #[test]
    fn test_query_window_filter() {
        let command = Command::Query(TabQuery::window(WindowId::new(3)));
        let value = serde_json::to_value(command).expect("serialize");
        assert_eq!(value["params"]["windowId"], 3);
    }

    #[test]
    fn test_execute_script_serialization() {
        let command = Command::ExecuteScript {
            tab_id: TabId::new(12),
            code: "document.title = \"¹A\";".to_string(),
        };
        assert_eq!(command.method(), "tabs.executeScript");

        let value = serde_json::to_value(command).expect("serialize");
        assert_eq!(value["method"], "tabs.executeScript");
        assert_eq!(value["params"]["tabId"], 12);
        assert_eq!(value["params"]["code"], "document.title = \"¹A\";");
    }
}
