//! WebSocket-backed host.
//!
//! [`RemoteHost`] turns [`TabHost`] calls into `tabs.*` requests on a
//! [`Connection`] and turns incoming events into [`TabEvent`] messages.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::identifiers::TabId;
use crate::protocol::{Command, Request, TabEvent};
use crate::transport::{Connection, ReadyData};

use super::{HostFamily, TabHost, TabQuery, TabSnapshot};

// ============================================================================
// RemoteHost
// ============================================================================

/// A [`TabHost`] living on the other end of a WebSocket.
#[derive(Clone)]
pub struct RemoteHost {
    connection: Connection,
    ready: ReadyData,
    request_timeout: Duration,
}

impl fmt::Debug for RemoteHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteHost")
            .field("browser", &self.ready.browser)
            .field("family", &self.ready.family)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl RemoteHost {
    /// Wraps an established connection.
    #[must_use]
    pub fn new(connection: Connection, ready: ReadyData, request_timeout: Duration) -> Self {
        Self {
            connection,
            ready,
            request_timeout,
        }
    }

    /// Routes incoming tab events into a channel.
    ///
    /// Replaces any previous subscription. The channel closes when the
    /// connection does.
    #[must_use]
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<TabEvent> {
        let (tx, rx) = mpsc::unbounded_channel();

        self.connection.set_event_handler(Box::new(move |event| {
            let parsed = event.parse();
            trace!(method = %parsed.method(), "Tab event received");
            let _ = tx.send(parsed);
        }));

        rx
    }

    /// Returns the READY handshake data.
    #[inline]
    #[must_use]
    pub fn ready(&self) -> &ReadyData {
        &self.ready
    }

    /// Drops the event subscription and closes the connection.
    pub fn shutdown(&self) {
        self.connection.clear_event_handler();
        self.connection.shutdown();
    }

    /// Sends a command and returns its result payload.
    async fn send(&self, command: Command) -> Result<Value> {
        let method = command.method();
        let request = Request::new(command);
        debug!(request_id = %request.id, method, "Sending command");

        self.connection
            .request(request, self.request_timeout)
            .await?
            .into_result()
    }
}

// ============================================================================
// TabHost Implementation
// ============================================================================

#[async_trait]
impl TabHost for RemoteHost {
    async fn query_tabs(&self, query: &TabQuery) -> Result<Vec<TabSnapshot>> {
        let mut result = self.send(Command::Query(*query)).await?;

        let tabs = result
            .get_mut("tabs")
            .map(Value::take)
            .ok_or_else(|| Error::protocol("tabs.query result has no `tabs` field"))?;

        Ok(serde_json::from_value(tabs)?)
    }

    async fn execute_script(&self, tab_id: TabId, code: &str) -> Result<()> {
        let command = Command::ExecuteScript {
            tab_id,
            code: code.to_string(),
        };

        match self.send(command).await {
            Ok(_) => Ok(()),
            Err(Error::Remote { message, .. }) => Err(Error::script_error(tab_id, message)),
            Err(e) => Err(e),
        }
    }

    fn family(&self) -> HostFamily {
        self.ready.family
    }
}

// ============================================================================
// Tests
// ============================================================================
