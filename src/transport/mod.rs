//! WebSocket transport layer.
//!
//! This module handles communication between the numbering service (Rust)
//! and the companion extension via WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Service (Rust) │                              │  Extension      │
//! │                 │         WebSocket            │  (Background)   │
//! │  PendingServer  │◄────────────────────────────►│                 │
//! │  → Connection   │      localhost:PORT          │  browser.tabs   │
//! │                 │                              │  relay          │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `PendingServer::bind` - Bind to localhost
//! 2. `PendingServer::next_peer` - Wait for a TCP peer
//! 3. `PendingServer::handshake` - Upgrade and read READY (browser name)
//! 4. `Connection::request` - Send commands, receive responses/events
//! 5. `Connection::shutdown` - Close connection
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and event loop |
//! | `server` | WebSocket server binding and acceptance |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

/// WebSocket server the extension connects to.
pub mod server;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, EventHandler, ReadyData};
pub use server::PendingServer;
