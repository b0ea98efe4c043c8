//! Tab numbering engine.
//!
//! | Operation | Trigger |
//! |-----------|---------|
//! | [`TabNumberer::update`] | tab updated |
//! | [`TabNumberer::update_all`] | start, tab created / attached / moved |
//! | [`TabNumberer::confirm_removal`] | tab removed |
//!
//! [`run`] wires those triggers to a stream of [`TabEvent`](crate::TabEvent)s.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`TabNumberer`] and its operations |
//! | `dispatch` | Event loop |
//! | `options` | [`NumbererOptions`] |
//! | `outcome` | Reports returned by the operations |

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod dispatch;
mod options;
mod outcome;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::TabNumberer;
pub use dispatch::run;
pub use options::{DEFAULT_REMOVAL_POLL_INTERVAL, NumbererOptions};
pub use outcome::{EventOutcome, RemovalOutcome, ResyncReport, SyncState, UpdateOutcome};
