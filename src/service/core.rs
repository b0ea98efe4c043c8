//! Service lifecycle.
//!
//! A [`Service`] is inert configuration. [`Service::bind`] opens the
//! WebSocket server; [`BoundService::serve`] then accepts the extension,
//! numbers every tab and keeps reacting to tab events. When the extension
//! disconnects (browser closed, extension reloaded) the service waits for
//! it to connect again.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::Result;
use crate::host::{RemoteHost, TabHost};
use crate::numberer::{NumbererOptions, TabNumberer, run};
use crate::transport::{Connection, PendingServer, ReadyData};

use super::builder::ServiceBuilder;

// ============================================================================
// Service
// ============================================================================

/// Validated service configuration.
#[derive(Debug, Clone)]
pub struct Service {
    ip: IpAddr,
    port: u16,
    accept_timeout: Option<Duration>,
    request_timeout: Duration,
    options: NumbererOptions,
}

impl Service {
    /// Creates a configuration builder for the service.
    #[inline]
    #[must_use]
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    pub(crate) fn from_builder(builder: ServiceBuilder) -> Self {
        Self {
            ip: builder.ip,
            port: builder.port,
            accept_timeout: builder.accept_timeout,
            request_timeout: builder.request_timeout,
            options: builder.options,
        }
    }

    /// Binds the WebSocket server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the address cannot be bound.
    pub async fn bind(self) -> Result<BoundService> {
        let server = PendingServer::bind(self.ip, self.port).await?;
        info!(url = %server.ws_url(), "Waiting for extension");

        Ok(BoundService {
            server,
            service: self,
        })
    }
}

// ============================================================================
// BoundService
// ============================================================================

/// A service whose WebSocket server is listening.
pub struct BoundService {
    server: PendingServer,
    service: Service,
}

impl fmt::Debug for BoundService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundService")
            .field("addr", &self.server.local_addr())
            .field("service", &self.service)
            .finish()
    }
}

impl BoundService {
    /// Returns the URL the extension should connect to.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        self.server.ws_url()
    }

    /// Returns the bound address.
    #[inline]
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.server.local_addr()
    }

    /// Serves extension connections one after another.
    ///
    /// A peer that fails its handshake (not WebSocket, no READY) is logged
    /// and dropped, as is a session that ends in an error. Either way the
    /// next peer is awaited.
    ///
    /// # Errors
    ///
    /// Returns an error only if no peer connects within the configured
    /// accept timeout, or if the listener itself fails.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer) = self.server.next_peer(self.service.accept_timeout).await?;

            let (connection, ready) = match self.server.handshake(stream).await {
                Ok(handshake) => handshake,
                Err(error) => {
                    warn!(%peer, %error, "Extension handshake failed");
                    continue;
                }
            };

            if let Err(error) = self.serve_host(self.remote_host(connection, ready)).await {
                warn!(%error, "Extension session ended with error");
            }
        }
    }

    /// Accepts one extension connection and serves it until it closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or the
    /// initial tab enumeration fails.
    pub async fn serve_once(&self) -> Result<()> {
        let (connection, ready) = self.server.accept(self.service.accept_timeout).await?;
        self.serve_host(self.remote_host(connection, ready)).await
    }

    fn remote_host(&self, connection: Connection, ready: ReadyData) -> RemoteHost {
        info!(
            browser = %ready.browser,
            version = %ready.version,
            family = %ready.family,
            "Extension connected"
        );

        RemoteHost::new(connection, ready, self.service.request_timeout)
    }

    async fn serve_host(&self, host: RemoteHost) -> Result<()> {
        let events = host.subscribe();
        let host = Arc::new(host);
        let numberer = Arc::new(TabNumberer::with_options(
            Arc::clone(&host),
            self.service.options.clone(),
        ));

        let result = run(numberer, events).await;
        host.shutdown();

        info!(family = %host.family(), "Extension disconnected");
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
