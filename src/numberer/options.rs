//! Numberer configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tab_numbering::{Capacity, NumbererOptions};
//!
//! let options = NumbererOptions::new()
//!     .with_removal_poll_interval(Duration::from_millis(50))
//!     .with_max_removal_polls(200)
//!     .with_capacity(Capacity::FIREFOX);
//!
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::numbering::Capacity;

// ============================================================================
// Constants
// ============================================================================

/// Delay between checks that a removed tab has left the tab list.
pub const DEFAULT_REMOVAL_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// NumbererOptions
// ============================================================================

/// Tuning knobs for [`TabNumberer`](super::TabNumberer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumbererOptions {
    /// Delay between removal-confirmation polls.
    pub removal_poll_interval: Duration,

    /// Give up confirming a removal after this many polls.
    ///
    /// `None` polls until the host stops listing the tab.
    pub max_removal_polls: Option<u32>,

    /// Fixed number of numbered positions.
    ///
    /// `None` derives it from the host's browser family on every update.
    pub capacity: Option<Capacity>,
}

impl Default for NumbererOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl NumbererOptions {
    /// Creates options with default settings.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            removal_poll_interval: DEFAULT_REMOVAL_POLL_INTERVAL,
            max_removal_polls: None,
            capacity: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl NumbererOptions {
    /// Sets the delay between removal-confirmation polls.
    #[inline]
    #[must_use]
    pub fn with_removal_poll_interval(mut self, interval: Duration) -> Self {
        self.removal_poll_interval = interval;
        self
    }

    /// Caps the number of removal-confirmation polls.
    #[inline]
    #[must_use]
    pub fn with_max_removal_polls(mut self, polls: u32) -> Self {
        self.max_removal_polls = Some(polls);
        self
    }

    /// Overrides the capacity derived from the browser family.
    #[inline]
    #[must_use]
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl NumbererOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.removal_poll_interval.is_zero() {
            return Err("Removal poll interval must be greater than zero".to_string());
        }

        if self.max_removal_polls == Some(0) {
            return Err("Max removal polls must be at least one".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
