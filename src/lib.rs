//! Tab numbering - superscript position prefixes for browser tab titles.
//!
//! Browsers jump to "tab N" with `Ctrl+1` .. `Ctrl+9`, but nothing on
//! screen says which tab is which number. This library keeps every tab
//! title prefixed with its position glyph (`¹`, `²`, ... `⁹`).
//!
//! # Architecture
//!
//! The library follows a client-server model:
//!
//! - **Service (Rust)**: Owns all numbering logic, listens on a WebSocket
//! - **Extension (Browser)**: Relays `browser.tabs` calls and events
//!
//! Key design principles:
//!
//! - The host browser is an explicit [`TabHost`] object, never a global
//! - Titles are recomputed from fresh snapshots, so passes are idempotent
//! - Per-tab failures are captured as values and never abort a resync
//! - Event-driven; the only polling is waiting out tab removals
//!
//! # Quick Start
//!
//! ```no_run
//! use tab_numbering::{Result, Service};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let bound = Service::builder().port(7878).build()?.bind().await?;
//!     println!("Extension URL: {}", bound.ws_url());
//!
//!     bound.serve().await
//! }
//! ```
//!
//! Embedding with a custom host:
//!
//! ```
//! use std::sync::Arc;
//! use tab_numbering::{HostFamily, MemoryHost, TabNumberer};
//!
//! # async fn example() -> tab_numbering::Result<()> {
//! let host = Arc::new(MemoryHost::new(HostFamily::Firefox));
//! host.open_tab("Inbox");
//!
//! let numberer = TabNumberer::new(host);
//! let report = numberer.update_all().await?;
//! assert_eq!(report.retitled(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`host`] | [`TabHost`] trait and implementations |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`numberer`] | [`TabNumberer`] and event loop |
//! | [`numbering`] | Glyphs and title composition |
//! | [`protocol`] | WebSocket message types (internal) |
//! | [`service`] | [`Service`] wiring everything together |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Host browser abstraction.
///
/// - [`TabHost`] - Capabilities the numberer consumes
/// - [`RemoteHost`] - Extension over WebSocket
/// - [`MemoryHost`] - In-process tab list
pub mod host;

/// Type-safe identifiers for host entities.
pub mod identifiers;

/// Tab numbering engine.
pub mod numberer;

/// Glyph table and title composition.
pub mod numbering;

/// WebSocket protocol message types.
///
/// Internal module defining command/response/event structures.
pub mod protocol;

/// Numbering service.
///
/// Use [`Service::builder()`] to create a configured service.
pub mod service;

/// WebSocket transport layer.
///
/// Internal module handling the WebSocket server and connection.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Host types
pub use host::{HostFamily, MemoryHost, RemoteHost, TabHost, TabQuery, TabSnapshot};

// Identifier types
pub use identifiers::{RequestId, TabId, WindowId};

// Numberer types
pub use numberer::{
    EventOutcome, NumbererOptions, RemovalOutcome, ResyncReport, SyncState, TabNumberer,
    UpdateOutcome,
};

// Numbering types
pub use numbering::{Capacity, GLYPHS};

// Protocol types
pub use protocol::TabEvent;

// Service types
pub use service::{BoundService, Service, ServiceBuilder};
