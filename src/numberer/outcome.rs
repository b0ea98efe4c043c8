//! Results reported by the numberer.
//!
//! Per-tab failures are captured as values here instead of being returned
//! as errors, so one misbehaving tab never hides the others.

// ============================================================================
// Imports
// ============================================================================

use crate::error::Error;
use crate::identifiers::TabId;

// ============================================================================
// SyncState
// ============================================================================

/// Whether a resync pass is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No resync in flight.
    Idle,
    /// At least one resync pass is executing.
    Resyncing,
}

// ============================================================================
// UpdateOutcome
// ============================================================================

/// What happened to a single tab during an update.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The tab has no title yet; nothing was done.
    Skipped,
    /// The title already carried the right number.
    Unchanged,
    /// The title was rewritten.
    Retitled {
        /// Title that was applied.
        title: String,
    },
    /// The host refused the rewrite.
    Failed {
        /// Error from the host.
        error: Error,
    },
}

impl UpdateOutcome {
    /// Returns `true` if the title was rewritten.
    #[inline]
    #[must_use]
    pub fn is_retitled(&self) -> bool {
        matches!(self, Self::Retitled { .. })
    }

    /// Returns `true` if the host refused the rewrite.
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

// ============================================================================
// ResyncReport
// ============================================================================

/// Per-tab outcomes of one resync pass.
#[derive(Debug, Default)]
pub struct ResyncReport {
    outcomes: Vec<(TabId, UpdateOutcome)>,
}

impl ResyncReport {
    /// Creates a report from per-tab outcomes.
    #[must_use]
    pub fn new(outcomes: Vec<(TabId, UpdateOutcome)>) -> Self {
        Self { outcomes }
    }

    /// Returns the number of tabs visited.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns `true` if no tabs were visited.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns the number of tabs whose title was rewritten.
    #[must_use]
    pub fn retitled(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_retitled()).count()
    }

    /// Returns the number of tabs the host refused to rewrite.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failed()).count()
    }

    /// Returns the outcome for a tab, if it was visited.
    #[must_use]
    pub fn outcome(&self, tab_id: TabId) -> Option<&UpdateOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == tab_id)
            .map(|(_, o)| o)
    }

    /// Iterates over all outcomes in host order.
    pub fn iter(&self) -> impl Iterator<Item = &(TabId, UpdateOutcome)> {
        self.outcomes.iter()
    }
}

// ============================================================================
// RemovalOutcome
// ============================================================================

/// Result of waiting for a removed tab to leave the tab list.
#[derive(Debug)]
pub enum RemovalOutcome {
    /// The tab disappeared and a resync ran.
    Confirmed {
        /// Polls taken, including the one that saw the tab gone.
        polls: u32,
        /// The resync that followed.
        report: ResyncReport,
    },
    /// The poll limit was reached while the tab was still listed.
    Abandoned {
        /// Polls taken.
        polls: u32,
    },
}

// ============================================================================
// EventOutcome
// ============================================================================

/// Result of handling one tab event.
#[derive(Debug)]
pub enum EventOutcome {
    /// Every tab was renumbered.
    Resynced(ResyncReport),
    /// A single tab was renumbered.
    Updated {
        /// Tab that changed.
        tab_id: TabId,
        /// What happened to it.
        outcome: UpdateOutcome,
    },
    /// A removal was waited out.
    Removal(RemovalOutcome),
    /// The event does not affect numbering.
    Ignored,
}

// ============================================================================
// Tests
// ============================================================================
