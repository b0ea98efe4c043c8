//! In-process tab host.
//!
//! [`MemoryHost`] keeps an ordered tab list behind a mutex and applies
//! `document.title` assignments directly to it. It reproduces the host
//! behaviours numbering has to cope with:
//!
//! - tabs whose page has no title yet
//! - pages that refuse script injection
//! - tabs that stay listed for a few queries after they were closed
//!
//! # Example
//!
//! ```
//! use tab_numbering::{HostFamily, MemoryHost};
//!
//! let host = MemoryHost::new(HostFamily::Chromium);
//! let tab = host.open_tab("Example");
//! assert_eq!(tab.index, 0);
//! ```

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::identifiers::{TabId, WindowId};
use crate::numbering::parse_set_title_script;

use super::{HostFamily, TabHost, TabQuery, TabSnapshot};

// ============================================================================
// Constants
// ============================================================================

/// Window used by the single-window helpers.
const DEFAULT_WINDOW: WindowId = WindowId::new(1);

// ============================================================================
// Types
// ============================================================================

/// A tab as stored by the host.
#[derive(Debug, Clone)]
struct MemoryTab {
    id: TabId,
    window_id: WindowId,
    title: Option<String>,
    restricted: bool,
    /// Remaining queries that still list the tab after it was closed.
    closing: Option<u32>,
}

/// Mutable host state.
#[derive(Debug, Default)]
struct State {
    tabs: Vec<MemoryTab>,
    next_id: u32,
    scripts: Vec<(TabId, String)>,
    queries: usize,
}

impl State {
    fn position(&self, tab_id: TabId) -> Option<usize> {
        self.tabs.iter().position(|t| t.id == tab_id)
    }

    fn snapshot(&self, tab: &MemoryTab) -> TabSnapshot {
        let index = self
            .tabs
            .iter()
            .filter(|t| t.window_id == tab.window_id)
            .take_while(|t| t.id != tab.id)
            .count();

        TabSnapshot {
            id: tab.id,
            index,
            title: tab.title.clone(),
            window_id: Some(tab.window_id),
        }
    }

    fn snapshot_of(&self, tab_id: TabId) -> Option<TabSnapshot> {
        self.position(tab_id).map(|pos| self.snapshot(&self.tabs[pos]))
    }

    /// Advances lingering closes by one query.
    fn tick_closing(&mut self) {
        self.tabs.retain(|t| t.closing != Some(0));
        for tab in &mut self.tabs {
            if let Some(remaining) = tab.closing.as_mut() {
                *remaining -= 1;
            }
        }
    }
}

// ============================================================================
// MemoryHost
// ============================================================================

/// Tab host backed by an in-memory tab list.
#[derive(Debug)]
pub struct MemoryHost {
    family: HostFamily,
    state: Mutex<State>,
}

impl MemoryHost {
    /// Creates an empty host of the given family.
    #[must_use]
    pub fn new(family: HostFamily) -> Self {
        Self {
            family,
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }
}

// ============================================================================
// MemoryHost - Tab Lifecycle
// ============================================================================

impl MemoryHost {
    /// Opens a titled tab at the end of the default window.
    pub fn open_tab(&self, title: impl Into<String>) -> TabSnapshot {
        self.open(DEFAULT_WINDOW, Some(title.into()))
    }

    /// Opens a tab whose page has not produced a title yet.
    pub fn open_untitled(&self) -> TabSnapshot {
        self.open(DEFAULT_WINDOW, None)
    }

    /// Opens a titled tab at the end of `window_id`.
    pub fn open_tab_in(&self, window_id: WindowId, title: impl Into<String>) -> TabSnapshot {
        self.open(window_id, Some(title.into()))
    }

    fn open(&self, window_id: WindowId, title: Option<String>) -> TabSnapshot {
        let mut state = self.state.lock();
        let id = TabId::new(state.next_id);
        state.next_id += 1;

        let tab = MemoryTab {
            id,
            window_id,
            title,
            restricted: false,
            closing: None,
        };
        let snapshot = state.snapshot(&tab);
        state.tabs.push(tab);
        snapshot
    }

    /// Closes a tab immediately.
    ///
    /// Returns `false` if the tab does not exist.
    pub fn close_tab(&self, tab_id: TabId) -> bool {
        let mut state = self.state.lock();
        match state.position(tab_id) {
            Some(pos) => {
                state.tabs.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Closes a tab but keeps listing it for the next `queries` queries.
    ///
    /// Returns `false` if the tab does not exist.
    pub fn close_tab_lingering(&self, tab_id: TabId, queries: u32) -> bool {
        let mut state = self.state.lock();
        match state.position(tab_id) {
            Some(pos) => {
                state.tabs[pos].closing = Some(queries);
                true
            }
            None => false,
        }
    }

    /// Moves a tab to `to_index` within its window.
    ///
    /// Returns the tab's new snapshot, or `None` if it does not exist.
    pub fn move_tab(&self, tab_id: TabId, to_index: usize) -> Option<TabSnapshot> {
        let window_id = self.state.lock().tabs.iter().find(|t| t.id == tab_id)?.window_id;
        self.attach_tab(tab_id, window_id, to_index)
    }

    /// Moves a tab into `window_id` at `to_index`, like a drag between
    /// windows.
    ///
    /// Returns the tab's new snapshot, or `None` if it does not exist.
    pub fn attach_tab(
        &self,
        tab_id: TabId,
        window_id: WindowId,
        to_index: usize,
    ) -> Option<TabSnapshot> {
        let mut state = self.state.lock();
        let pos = state.position(tab_id)?;
        let mut tab = state.tabs.remove(pos);
        tab.window_id = window_id;

        let window_positions: Vec<usize> = state
            .tabs
            .iter()
            .enumerate()
            .filter(|(_, t)| t.window_id == window_id)
            .map(|(i, _)| i)
            .collect();

        let insert_at = match window_positions.get(to_index) {
            Some(&global) => global,
            None => window_positions.last().map_or(state.tabs.len(), |&last| last + 1),
        };

        state.tabs.insert(insert_at, tab);
        state.snapshot_of(tab_id)
    }

    /// Simulates the page changing its own title.
    ///
    /// Returns the tab's new snapshot, or `None` if it does not exist.
    pub fn set_page_title(&self, tab_id: TabId, title: impl Into<String>) -> Option<TabSnapshot> {
        let mut state = self.state.lock();
        let pos = state.position(tab_id)?;
        state.tabs[pos].title = Some(title.into());
        state.snapshot_of(tab_id)
    }

    /// Makes the tab refuse script injection, like a privileged page.
    ///
    /// Returns `false` if the tab does not exist.
    pub fn restrict(&self, tab_id: TabId) -> bool {
        let mut state = self.state.lock();
        match state.position(tab_id) {
            Some(pos) => {
                state.tabs[pos].restricted = true;
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// MemoryHost - Inspection
// ============================================================================

impl MemoryHost {
    /// Returns the current snapshot of a tab.
    #[must_use]
    pub fn tab(&self, tab_id: TabId) -> Option<TabSnapshot> {
        self.state.lock().snapshot_of(tab_id)
    }

    /// Returns the current title of a tab.
    #[must_use]
    pub fn title(&self, tab_id: TabId) -> Option<String> {
        self.tab(tab_id).and_then(|t| t.title)
    }

    /// Returns all titles in tab order; untitled tabs yield an empty string.
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .tabs
            .iter()
            .map(|t| t.title.clone().unwrap_or_default())
            .collect()
    }

    /// Returns every script injection attempt, in order.
    #[must_use]
    pub fn scripts(&self) -> Vec<(TabId, String)> {
        self.state.lock().scripts.clone()
    }

    /// Returns the number of script injection attempts.
    #[must_use]
    pub fn script_count(&self) -> usize {
        self.state.lock().scripts.len()
    }

    /// Returns the number of tab queries served.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.state.lock().queries
    }
}

// ============================================================================
// TabHost Implementation
// ============================================================================

#[async_trait]
impl TabHost for MemoryHost {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabSnapshot>> {
        let mut state = self.state.lock();
        state.queries += 1;
        state.tick_closing();

        let tabs = state
            .tabs
            .iter()
            .map(|t| state.snapshot(t))
            .filter(|t| query.matches(t))
            .collect();

        Ok(tabs)
    }

    async fn execute_script(&self, tab_id: TabId, code: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.scripts.push((tab_id, code.to_string()));

        let pos = state
            .position(tab_id)
            .ok_or_else(|| Error::tab_not_found(tab_id))?;

        if state.tabs[pos].restricted {
            return Err(Error::script_error(
                tab_id,
                "Missing host permission for the tab",
            ));
        }

        let title = parse_set_title_script(code)
            .ok_or_else(|| Error::script_error(tab_id, "Unsupported script"))?;

        state.tabs[pos].title = Some(title);
        Ok(())
    }

    fn family(&self) -> HostFamily {
        self.family
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::numbering::set_title_script;

    #[tokio::test]
    async fn test_query_orders_by_window_index() {
        let host = MemoryHost::new(HostFamily::Firefox);
        let a = host.open_tab("A");
        let b = host.open_tab_in(WindowId::new(2), "B");
        let c = host.open_tab("C");

        assert_eq!(a.index, 0);
        assert_eq!(b.index, 0);
        assert_eq!(c.index, 1);

        let tabs = host.query_tabs(&TabQuery::all()).await.expect("query");
        assert_eq!(tabs.len(), 3);

        let window_two = host
            .query_tabs(&TabQuery::window(WindowId::new(2)))
            .await
            .expect("query");
        assert_eq!(window_two.len(), 1);
        assert_eq!(window_two[0].id, b.id);
    }

    #[tokio::test]
    async fn test_execute_script_sets_title() {
        let host = MemoryHost::new(HostFamily::Chromium);
        let tab = host.open_tab("Example");

        let code = set_title_script("¹Example").expect("render");
        host.execute_script(tab.id, &code).await.expect("execute");

        assert_eq!(host.title(tab.id).as_deref(), Some("¹Example"));
        assert_eq!(host.script_count(), 1);
    }

    #[tokio::test]
    async fn test_restricted_tab_rejects_script() {
        let host = MemoryHost::new(HostFamily::Chromium);
        let tab = host.open_tab("chrome://settings");
        assert!(host.restrict(tab.id));

        let code = set_title_script("¹Settings").expect("render");
        let err = host.execute_script(tab.id, &code).await.unwrap_err();
        assert!(matches!(err, Error::ScriptError { .. }));
        assert_eq!(host.title(tab.id).as_deref(), Some("chrome://settings"));
    }

    #[tokio::test]
    async fn test_missing_tab_rejects_script() {
        let host = MemoryHost::new(HostFamily::Chromium);
        let err = host
            .execute_script(TabId::new(99), "document.title = \"x\";")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TabNotFound { .. }));
    }

    #[tokio::test]
    async fn test_lingering_close() {
        let host = MemoryHost::new(HostFamily::Firefox);
        let a = host.open_tab("A");
        let b = host.open_tab("B");
        assert!(host.close_tab_lingering(a.id, 2));

        for _ in 0..2 {
            let tabs = host.query_tabs(&TabQuery::all()).await.expect("query");
            assert!(tabs.iter().any(|t| t.id == a.id));
        }

        let tabs = host.query_tabs(&TabQuery::all()).await.expect("query");
        assert_eq!(tabs.len(), 1);
        assert_eq!(tabs[0].id, b.id);
        assert_eq!(tabs[0].index, 0);
        assert_eq!(host.query_count(), 3);
    }

    #[test]
    fn test_move_tab() {
        let host = MemoryHost::new(HostFamily::Chromium);
        let a = host.open_tab("A");
        host.open_tab("B");
        host.open_tab("C");

        let moved = host.move_tab(a.id, 2).expect("tab exists");
        assert_eq!(moved.index, 2);
        assert_eq!(host.titles(), vec!["B", "C", "A"]);

        let moved = host.move_tab(a.id, 0).expect("tab exists");
        assert_eq!(moved.index, 0);
        assert_eq!(host.titles(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_close_tab() {
        let host = MemoryHost::new(HostFamily::Chromium);
        let a = host.open_tab("A");
        assert!(host.close_tab(a.id));
        assert!(!host.close_tab(a.id));
        assert!(host.tab(a.id).is_none());
    }
}
