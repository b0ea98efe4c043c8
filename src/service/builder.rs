//! Builder pattern for service configuration.
//!
//! Provides a fluent API for configuring and creating [`Service`] instances.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tab_numbering::{NumbererOptions, Service};
//!
//! # fn example() -> tab_numbering::Result<()> {
//! let service = Service::builder()
//!     .port(7878)
//!     .request_timeout(Duration::from_secs(10))
//!     .options(NumbererOptions::new().with_max_removal_polls(600))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::numberer::NumbererOptions;

use super::core::Service;

// ============================================================================
// Constants
// ============================================================================

/// Default bind address (localhost).
const DEFAULT_BIND_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default timeout for a single `tabs.*` request.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// ServiceBuilder
// ============================================================================

/// Builder for configuring a [`Service`] instance.
///
/// Use [`Service::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    /// Address to bind.
    pub(crate) ip: IpAddr,
    /// Port to bind (0 for random).
    pub(crate) port: u16,
    /// Limit on waiting for the extension to connect.
    pub(crate) accept_timeout: Option<Duration>,
    /// Limit on each `tabs.*` request.
    pub(crate) request_timeout: Duration,
    /// Numberer tuning.
    pub(crate) options: NumbererOptions,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self {
            ip: DEFAULT_BIND_IP,
            port: 0,
            accept_timeout: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            options: NumbererOptions::default(),
        }
    }
}

// ============================================================================
// ServiceBuilder Implementation
// ============================================================================

impl ServiceBuilder {
    /// Creates a builder with default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the IP address to bind.
    #[inline]
    #[must_use]
    pub fn ip(mut self, ip: IpAddr) -> Self {
        self.ip = ip;
        self
    }

    /// Sets the port to bind (0 picks a random port).
    #[inline]
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Limits how long to wait for the extension to connect.
    #[inline]
    #[must_use]
    pub fn accept_timeout(mut self, timeout: Duration) -> Self {
        self.accept_timeout = Some(timeout);
        self
    }

    /// Sets the timeout for each request sent to the extension.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the numberer options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: NumbererOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates the configuration and builds the service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if any option is invalid.
    pub fn build(self) -> Result<Service> {
        self.options.validate().map_err(Error::config)?;

        if self.request_timeout.is_zero() {
            return Err(Error::config("Request timeout must be greater than zero"));
        }

        if self.accept_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::config("Accept timeout must be greater than zero"));
        }

        Ok(Service::from_builder(self))
    }
}

// ============================================================================
// Tests
// ============================================================================
