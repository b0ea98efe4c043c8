//! The tab numberer.
//!
//! [`TabNumberer`] owns no tab state. Every operation reads fresh
//! snapshots from its [`TabHost`] and writes titles back through it, so
//! overlapping passes are harmless: each one strips and re-applies the
//! number, converging on the same titles.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::host::{TabHost, TabQuery, TabSnapshot};
use crate::identifiers::TabId;
use crate::numbering::{Capacity, renumber, set_title_script};
use crate::protocol::TabEvent;

use super::options::NumbererOptions;
use super::outcome::{EventOutcome, RemovalOutcome, ResyncReport, SyncState, UpdateOutcome};

// ============================================================================
// ResyncGuard
// ============================================================================

/// Counts a resync as in flight for as long as it is alive.
struct ResyncGuard<'a>(&'a AtomicUsize);

impl<'a> ResyncGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ResyncGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// TabNumberer
// ============================================================================

/// Keeps tab titles prefixed with their position glyph.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tab_numbering::{HostFamily, MemoryHost, TabNumberer};
///
/// # async fn example() -> tab_numbering::Result<()> {
/// let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
/// let tab = host.open_tab("Example");
///
/// let numberer = TabNumberer::new(Arc::clone(&host));
/// numberer.update_all().await?;
///
/// assert_eq!(host.title(tab.id).as_deref(), Some("¹Example"));
/// # Ok(())
/// # }
/// ```
pub struct TabNumberer<H: TabHost + ?Sized> {
    host: Arc<H>,
    options: NumbererOptions,
    resyncs: AtomicUsize,
}

impl<H: TabHost + ?Sized> fmt::Debug for TabNumberer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabNumberer")
            .field("family", &self.host.family())
            .field("options", &self.options)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<H: TabHost + ?Sized> TabNumberer<H> {
    /// Creates a numberer with default options.
    #[must_use]
    pub fn new(host: Arc<H>) -> Self {
        Self::with_options(host, NumbererOptions::default())
    }

    /// Creates a numberer with explicit options.
    #[must_use]
    pub fn with_options(host: Arc<H>, options: NumbererOptions) -> Self {
        Self {
            host,
            options,
            resyncs: AtomicUsize::new(0),
        }
    }
}

// ============================================================================
// TabNumberer - Accessors
// ============================================================================

impl<H: TabHost + ?Sized> TabNumberer<H> {
    /// Returns the host.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &NumbererOptions {
        &self.options
    }

    /// Returns the number of positions that currently receive a glyph.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> Capacity {
        self.options
            .capacity
            .unwrap_or_else(|| self.host.family().capacity())
    }

    /// Returns whether a resync is in flight.
    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.resyncs.load(Ordering::SeqCst) == 0 {
            SyncState::Idle
        } else {
            SyncState::Resyncing
        }
    }
}

// ============================================================================
// TabNumberer - Operations
// ============================================================================

impl<H: TabHost + ?Sized> TabNumberer<H> {
    /// Brings one tab's title in line with its index.
    ///
    /// Never fails: a host refusal is logged and reported as
    /// [`UpdateOutcome::Failed`].
    pub async fn update(&self, tab: &TabSnapshot) -> UpdateOutcome {
        if tab.title.as_deref().is_none_or(str::is_empty) {
            trace!(tab_id = %tab.id, "Tab has no title yet");
            return UpdateOutcome::Skipped;
        }

        let Some(title) = renumber(tab.title.as_deref(), tab.index, self.capacity()) else {
            return UpdateOutcome::Unchanged;
        };

        match self.apply_title(tab.id, &title).await {
            Ok(()) => {
                debug!(tab_id = %tab.id, index = tab.index, %title, "Executed");
                UpdateOutcome::Retitled { title }
            }
            Err(error) => {
                warn!(tab_id = %tab.id, %error, "Tab numbering error");
                UpdateOutcome::Failed { error }
            }
        }
    }

    /// Renumbers every open tab.
    ///
    /// Tabs are updated concurrently and independently.
    ///
    /// # Errors
    ///
    /// Returns an error only if the tab list cannot be fetched.
    pub async fn update_all(&self) -> Result<ResyncReport> {
        let _guard = ResyncGuard::enter(&self.resyncs);

        let tabs = self.host.query_tabs(&TabQuery::all()).await?;
        let outcomes = join_all(
            tabs.iter()
                .map(|tab| async move { (tab.id, self.update(tab).await) }),
        )
        .await;

        let report = ResyncReport::new(outcomes);
        debug!(
            tabs = report.len(),
            retitled = report.retitled(),
            failed = report.failed(),
            "Resync complete"
        );

        Ok(report)
    }

    /// Waits until `tab_id` is no longer listed, then renumbers every tab.
    ///
    /// Hosts may announce a removal while still listing the tab, which
    /// would shift every index computed in the meantime. The first check
    /// runs immediately, later ones after
    /// [`removal_poll_interval`](NumbererOptions::removal_poll_interval).
    ///
    /// # Errors
    ///
    /// Returns an error if the tab list cannot be fetched.
    pub async fn confirm_removal(&self, tab_id: TabId) -> Result<RemovalOutcome> {
        let mut polls = 0u32;

        loop {
            polls += 1;
            let tabs = self.host.query_tabs(&TabQuery::all()).await?;

            if !tabs.iter().any(|tab| tab.id == tab_id) {
                debug!(%tab_id, polls, "Tab removal confirmed");
                let report = self.update_all().await?;
                return Ok(RemovalOutcome::Confirmed { polls, report });
            }

            if let Some(max) = self.options.max_removal_polls
                && polls >= max
            {
                warn!(%tab_id, polls, "Removed tab still listed, giving up");
                return Ok(RemovalOutcome::Abandoned { polls });
            }

            trace!(%tab_id, polls, "Removed tab still listed");
            sleep(self.options.removal_poll_interval).await;
        }
    }

    /// Reacts to one host event.
    ///
    /// | Event | Action |
    /// |-------|--------|
    /// | created, attached, moved | [`update_all`](Self::update_all) |
    /// | updated | [`update`](Self::update) on that tab |
    /// | removed | [`confirm_removal`](Self::confirm_removal) |
    ///
    /// # Errors
    ///
    /// Returns an error if the tab list cannot be fetched.
    pub async fn handle(&self, event: TabEvent) -> Result<EventOutcome> {
        match event {
            TabEvent::Created { .. } | TabEvent::Attached { .. } | TabEvent::Moved { .. } => {
                Ok(EventOutcome::Resynced(self.update_all().await?))
            }

            TabEvent::Updated { tab_id, tab } => Ok(EventOutcome::Updated {
                tab_id,
                outcome: self.update(&tab).await,
            }),

            TabEvent::Removed { tab_id, .. } => {
                Ok(EventOutcome::Removal(self.confirm_removal(tab_id).await?))
            }

            TabEvent::Unknown { method, .. } => {
                debug!(%method, "Ignoring event");
                Ok(EventOutcome::Ignored)
            }
        }
    }

    /// Injects the title assignment into a tab.
    async fn apply_title(&self, tab_id: TabId, title: &str) -> Result<()> {
        let code = set_title_script(title)?;
        self.host.execute_script(tab_id, &code).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::error::Error;
    use crate::host::{HostFamily, MemoryHost};
    use crate::identifiers::WindowId;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn numberer(host: &Arc<MemoryHost>) -> TabNumberer<MemoryHost> {
        init_tracing();
        let options = NumbererOptions::new().with_removal_poll_interval(Duration::from_millis(1));
        TabNumberer::with_options(Arc::clone(host), options)
    }

    #[tokio::test]
    async fn test_first_tab_numbered_once_on_chromium() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let tab = host.open_tab("Example");
        let numberer = numberer(&host);

        let outcome = numberer.update(&tab).await;
        assert!(matches!(outcome, UpdateOutcome::Retitled { ref title } if title == "¹Example"));
        assert_eq!(host.title(tab.id).as_deref(), Some("¹Example"));

        let refreshed = host.tab(tab.id).expect("tab exists");
        assert!(matches!(
            numberer.update(&refreshed).await,
            UpdateOutcome::Unchanged
        ));
        assert_eq!(host.script_count(), 1);
    }

    #[tokio::test]
    async fn test_firefox_ninth_tab_loses_glyph() {
        let host = Arc::new(MemoryHost::new(HostFamily::Firefox));
        for i in 0..8 {
            host.open_tab(format!("Tab {i}"));
        }
        let ninth = host.open_tab("¹Example");
        assert_eq!(ninth.index, 8);

        let numberer = numberer(&host);
        numberer.update(&ninth).await;

        assert_eq!(host.title(ninth.id).as_deref(), Some("Example"));
    }

    #[tokio::test]
    async fn test_untitled_tab_is_skipped() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let tab = host.open_untitled();
        let numberer = numberer(&host);

        assert!(matches!(numberer.update(&tab).await, UpdateOutcome::Skipped));

        let empty = TabSnapshot::new(tab.id, 0, "");
        assert!(matches!(numberer.update(&empty).await, UpdateOutcome::Skipped));
        assert_eq!(host.script_count(), 0);
    }

    #[tokio::test]
    async fn test_update_all_numbers_every_tab() {
        let host = Arc::new(MemoryHost::new(HostFamily::Firefox));
        for title in ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"] {
            host.open_tab(title);
        }
        let numberer = numberer(&host);

        let report = numberer.update_all().await.expect("resync");
        assert_eq!(report.len(), 10);
        assert_eq!(report.retitled(), 8);
        assert_eq!(
            host.titles(),
            vec!["¹A", "²B", "³C", "⁴D", "⁵E", "⁶F", "⁷G", "⁸H", "I", "J"]
        );

        let again = numberer.update_all().await.expect("resync");
        assert_eq!(again.retitled(), 0);
        assert_eq!(host.script_count(), 8);
    }

    #[tokio::test]
    async fn test_windows_are_numbered_independently() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        host.open_tab("A");
        host.open_tab_in(WindowId::new(2), "B");
        host.open_tab("C");
        let numberer = numberer(&host);

        numberer.update_all().await.expect("resync");
        assert_eq!(host.titles(), vec!["¹A", "¹B", "²C"]);
    }

    #[tokio::test]
    async fn test_restricted_tab_does_not_block_batch() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let a = host.open_tab("A");
        let store = host.open_tab("Web Store");
        let c = host.open_tab("C");
        host.restrict(store.id);
        let numberer = numberer(&host);

        let report = numberer.update_all().await.expect("resync");
        assert_eq!(report.failed(), 1);
        assert_eq!(report.retitled(), 2);
        assert!(matches!(
            report.outcome(store.id),
            Some(UpdateOutcome::Failed {
                error: Error::ScriptError { .. }
            })
        ));
        assert_eq!(host.title(a.id).as_deref(), Some("¹A"));
        assert_eq!(host.title(store.id).as_deref(), Some("Web Store"));
        assert_eq!(host.title(c.id).as_deref(), Some("³C"));
    }

    #[tokio::test]
    async fn test_resync_waits_for_removed_tab_to_disappear() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let a = host.open_tab("A");
        let b = host.open_tab("B");
        let c = host.open_tab("C");
        let numberer = numberer(&host);
        numberer.update_all().await.expect("resync");
        assert_eq!(host.script_count(), 3);

        host.close_tab_lingering(a.id, 2);
        let queries_before = host.query_count();

        match numberer.confirm_removal(a.id).await.expect("confirm") {
            RemovalOutcome::Confirmed { polls, report } => {
                assert_eq!(polls, 3);
                assert_eq!(report.retitled(), 2);
            }
            other => panic!("expected confirmation, got {other:?}"),
        }

        // Three polls, then one resync query
        assert_eq!(host.query_count() - queries_before, 4);
        assert_eq!(host.title(b.id).as_deref(), Some("¹B"));
        assert_eq!(host.title(c.id).as_deref(), Some("²C"));
        assert_eq!(host.script_count(), 5);
    }

    #[tokio::test]
    async fn test_removal_already_gone_resyncs_immediately() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let a = host.open_tab("A");
        host.open_tab("²B");
        host.close_tab(a.id);
        let numberer = numberer(&host);

        match numberer.confirm_removal(a.id).await.expect("confirm") {
            RemovalOutcome::Confirmed { polls, .. } => assert_eq!(polls, 1),
            other => panic!("expected confirmation, got {other:?}"),
        }
        assert_eq!(host.titles(), vec!["¹B"]);
    }

    #[tokio::test]
    async fn test_removal_gives_up_at_poll_limit() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let a = host.open_tab("A");
        host.open_tab("B");
        host.close_tab_lingering(a.id, 10);

        let options = NumbererOptions::new()
            .with_removal_poll_interval(Duration::from_millis(1))
            .with_max_removal_polls(2);
        let numberer = TabNumberer::with_options(Arc::clone(&host), options);

        let outcome = numberer.confirm_removal(a.id).await.expect("confirm");
        assert!(matches!(outcome, RemovalOutcome::Abandoned { polls: 2 }));
        assert_eq!(host.script_count(), 0);
    }

    #[tokio::test]
    async fn test_handle_updated_touches_only_that_tab() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let a = host.open_tab("A");
        let b = host.open_tab("Inbox");
        let numberer = numberer(&host);

        let tab = host.set_page_title(b.id, "Inbox (2)").expect("tab exists");
        let outcome = numberer
            .handle(TabEvent::Updated { tab_id: b.id, tab })
            .await
            .expect("handle");

        assert!(matches!(
            outcome,
            EventOutcome::Updated { tab_id, outcome: UpdateOutcome::Retitled { .. } } if tab_id == b.id
        ));
        assert_eq!(host.title(b.id).as_deref(), Some("²Inbox (2)"));
        assert_eq!(host.title(a.id).as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_handle_moved_resyncs() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let a = host.open_tab("A");
        host.open_tab("B");
        let numberer = numberer(&host);
        numberer.update_all().await.expect("resync");

        host.move_tab(a.id, 1);
        let outcome = numberer
            .handle(TabEvent::Moved {
                tab_id: a.id,
                window_id: WindowId::new(1),
                from_index: 0,
                to_index: 1,
            })
            .await
            .expect("handle");

        assert!(matches!(outcome, EventOutcome::Resynced(ref r) if r.retitled() == 2));
        assert_eq!(host.titles(), vec!["¹B", "²A"]);
    }

    #[tokio::test]
    async fn test_handle_attached_resyncs() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        let a = host.open_tab("A");
        let b = host.open_tab("B");
        let c = host.open_tab_in(WindowId::new(2), "C");
        let numberer = numberer(&host);
        numberer.update_all().await.expect("resync");
        assert_eq!(host.title(c.id).as_deref(), Some("¹C"));

        host.attach_tab(c.id, WindowId::new(1), 0);
        let outcome = numberer
            .handle(TabEvent::Attached {
                tab_id: c.id,
                new_window_id: WindowId::new(1),
                new_position: 0,
            })
            .await
            .expect("handle");

        assert!(matches!(outcome, EventOutcome::Resynced(ref r) if r.retitled() == 2));
        assert_eq!(host.title(c.id).as_deref(), Some("¹C"));
        assert_eq!(host.title(a.id).as_deref(), Some("²A"));
        assert_eq!(host.title(b.id).as_deref(), Some("³B"));
    }

    #[tokio::test]
    async fn test_handle_unknown_is_ignored() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        host.open_tab("A");
        let numberer = numberer(&host);

        let outcome = numberer
            .handle(TabEvent::Unknown {
                method: "tabs.activated".to_string(),
                params: serde_json::Value::Null,
            })
            .await
            .expect("handle");

        assert!(matches!(outcome, EventOutcome::Ignored));
        assert_eq!(host.query_count(), 0);
    }

    #[tokio::test]
    async fn test_capacity_override() {
        let host = Arc::new(MemoryHost::new(HostFamily::Chromium));
        host.open_tab("A");
        host.open_tab("B");
        let capacity = Capacity::new(1).expect("valid capacity");
        let numberer = TabNumberer::with_options(
            Arc::clone(&host),
            NumbererOptions::new().with_capacity(capacity),
        );

        assert_eq!(numberer.capacity(), capacity);
        numberer.update_all().await.expect("resync");
        assert_eq!(host.titles(), vec!["¹A", "B"]);
    }

    #[tokio::test]
    async fn test_works_with_trait_object() {
        let memory = Arc::new(MemoryHost::new(HostFamily::Firefox));
        memory.open_tab("A");
        let host: Arc<dyn TabHost> = memory.clone();
        let numberer = TabNumberer::new(host);

        assert_eq!(numberer.capacity(), Capacity::FIREFOX);
        numberer.update_all().await.expect("resync");
        assert_eq!(memory.titles(), vec!["¹A"]);
    }

    /// Host whose tab query blocks until released.
    struct GatedHost {
        release: Notify,
    }

    #[async_trait]
    impl TabHost for GatedHost {
        async fn query_tabs(&self, _query: &TabQuery) -> Result<Vec<TabSnapshot>> {
            self.release.notified().await;
            Ok(Vec::new())
        }

        async fn execute_script(&self, tab_id: TabId, _code: &str) -> Result<()> {
            Err(Error::tab_not_found(tab_id))
        }

        fn family(&self) -> HostFamily {
            HostFamily::Chromium
        }
    }

    #[tokio::test]
    async fn test_state_tracks_resync() {
        let host = Arc::new(GatedHost {
            release: Notify::new(),
        });
        let numberer = Arc::new(TabNumberer::new(Arc::clone(&host)));
        assert_eq!(numberer.state(), SyncState::Idle);

        let task = tokio::spawn({
            let numberer = Arc::clone(&numberer);
            async move { numberer.update_all().await }
        });

        for _ in 0..100 {
            if numberer.state() == SyncState::Resyncing {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(numberer.state(), SyncState::Resyncing);

        host.release.notify_one();
        let report = task.await.expect("join").expect("resync");
        assert!(report.is_empty());
        assert_eq!(numberer.state(), SyncState::Idle);
    }
}
