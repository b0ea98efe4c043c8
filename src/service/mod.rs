//! Numbering service: server, host and event loop wired together.
//!
//! # Example
//!
//! ```no_run
//! use tab_numbering::Service;
//!
//! # async fn example() -> tab_numbering::Result<()> {
//! let service = Service::builder().port(7878).build()?;
//!
//! let bound = service.bind().await?;
//! println!("Point the extension at {}", bound.ws_url());
//! bound.serve().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Service configuration builder.
pub mod builder;

/// Service lifecycle.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::builder::ServiceBuilder;
pub use self::core::{BoundService, Service};
