//! WebSocket protocol message types.
//!
//! This module defines the message format for communication between the
//! numbering service (Rust) and the companion extension, which relays the
//! browser's `tabs` API.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Service → Extension | `tabs.*` command |
//! | `Response` | Extension → Service | Command result or error |
//! | `Event` | Extension → Service | Tab lifecycle notification |
//!
//! # Command Naming
//!
//! Commands and events follow the `tabs.methodName` format, mirroring the
//! WebExtension API they are relayed to:
//!
//! - `tabs.query`
//! - `tabs.executeScript`
//! - `tabs.removed`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command definitions |
//! | `event` | Event and parsed [`TabEvent`] types |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::Command;
pub use event::{Event, TabEvent};
pub use request::{Request, Response, ResponseType};
