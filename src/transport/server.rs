//! Listening socket for the companion extension.
//!
//! The extension's background script dials `ws://127.0.0.1:{port}` and
//! opens with a READY frame naming its browser. Accepting is split in two
//! stages so a caller can tell a dead listener from one bad peer:
//!
//! | Stage | Method | Failure scope |
//! |-------|--------|---------------|
//! | TCP accept | [`PendingServer::next_peer`] | listener (socket error, accept timeout) |
//! | Upgrade + READY | [`PendingServer::handshake`] | that peer only |
//!
//! The listener stays bound between peers, so a reloaded extension
//! reconnects to the same URL.

// ============================================================================
// Imports
// ============================================================================

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::Connection;
use super::connection::ReadyData;

// ============================================================================
// PendingServer
// ============================================================================

/// A bound listener awaiting the extension.
///
/// # Example
///
/// ```ignore
/// use std::net::{IpAddr, Ipv4Addr};
/// use tab_numbering::transport::PendingServer;
///
/// let server = PendingServer::bind(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).await?;
/// println!("point the extension at {}", server.ws_url());
///
/// let (connection, ready) = server.accept(None).await?;
/// ```
pub struct PendingServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl PendingServer {
    /// Binds the listener. Port 0 picks a free port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the address cannot be bound.
    pub async fn bind(ip: IpAddr, port: u16) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::new(ip, port)).await?;
        let addr = listener.local_addr()?;

        debug!(%addr, "Listening for extension");

        Ok(Self { listener, addr })
    }

    /// Returns the bound port.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Returns the URL the extension dials.
    #[inline]
    #[must_use]
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Returns the bound address.
    #[inline]
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Waits for the next TCP peer.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if nobody connects within `accept_timeout`
    /// - [`Error::Io`] if the listener itself fails
    pub async fn next_peer(
        &self,
        accept_timeout: Option<Duration>,
    ) -> Result<(TcpStream, SocketAddr)> {
        let accepted = match accept_timeout {
            Some(limit) => timeout(limit, self.listener.accept())
                .await
                .map_err(|_| Error::connection_timeout(limit.as_millis() as u64))?,
            None => self.listener.accept().await,
        };

        let (stream, peer) = accepted?;
        debug!(%peer, "Peer connected");
        Ok((stream, peer))
    }

    /// Upgrades a peer to WebSocket and reads its READY frame.
    ///
    /// # Errors
    ///
    /// - [`Error::Connection`] if the peer does not speak WebSocket
    /// - [`Error::ConnectionTimeout`] / [`Error::ConnectionClosed`] if READY never arrives
    /// - [`Error::Remote`] if the extension reports a startup failure
    pub async fn handshake(&self, stream: TcpStream) -> Result<(Connection, ReadyData)> {
        let ws_stream = tokio_tungstenite::accept_async(stream)
            .await
            .map_err(|e| Error::connection(format!("WebSocket upgrade failed: {e}")))?;

        let connection = Connection::new(ws_stream);
        let ready = match connection.wait_ready().await {
            Ok(ready) => ready,
            Err(error) => {
                connection.shutdown();
                return Err(error);
            }
        };

        info!(port = self.port(), browser = %ready.browser, "Extension handshake complete");
        Ok((connection, ready))
    }

    /// Accepts one peer and completes its handshake.
    ///
    /// # Errors
    ///
    /// Any error of [`next_peer`](Self::next_peer) or
    /// [`handshake`](Self::handshake).
    pub async fn accept(&self, accept_timeout: Option<Duration>) -> Result<(Connection, ReadyData)> {
        let (stream, _) = self.next_peer(accept_timeout).await?;
        self.handshake(stream).await
    }
}

// ============================================================================
// Tests
// ============================================================================
