//! Request relay over the extension's WebSocket.
//!
//! A single spawned task owns the socket. Callers serialize their
//! [`Request`], park a oneshot under its [`RequestId`] and queue the frame;
//! the task writes queued frames and reads incoming ones. An incoming frame
//! is either a [`Response`], which wakes the parked caller, or a tab
//! [`Event`], which goes to the installed [`EventHandler`].
//!
//! When the socket goes away every parked caller receives
//! [`Error::ConnectionClosed`] and the handler is dropped, which ends the
//! event stream it was feeding.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{from_str, to_string};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::host::HostFamily;
use crate::identifiers::RequestId;
use crate::protocol::{Event, Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Upper bound on parked callers.
///
/// A resync injects one script per tab at once.
const MAX_IN_FLIGHT: usize = 1024;

/// How long the extension has to send READY.
const READY_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Types
// ============================================================================

type Waiters = FxHashMap<RequestId, oneshot::Sender<Result<Response>>>;

/// Callback receiving every tab event from the extension.
pub type EventHandler = Box<dyn Fn(Event) + Send + Sync>;

/// Frames queued for the socket task.
enum Outbound {
    Frame { id: RequestId, text: String },
    Close,
}

// ============================================================================
// ReadyData
// ============================================================================

/// Browser identity reported in the READY frame.
#[derive(Debug, Clone)]
pub struct ReadyData {
    /// Browser name as reported by the extension.
    pub browser: String,
    /// Browser version, empty if not reported.
    pub version: String,
    /// Browser family derived from the name.
    pub family: HostFamily,
}

impl ReadyData {
    fn from_response(response: &Response) -> Self {
        let browser = response.get_string("browser");
        let family = HostFamily::from_browser_name(&browser);

        Self {
            version: response.get_string("version"),
            browser,
            family,
        }
    }
}

// ============================================================================
// Shared
// ============================================================================

/// State shared between callers and the socket task.
#[derive(Default)]
struct Shared {
    waiters: Mutex<Waiters>,
    handler: Mutex<Option<EventHandler>>,
}

impl Shared {
    fn park(&self, id: RequestId) -> Result<oneshot::Receiver<Result<Response>>> {
        let mut waiters = self.waiters.lock();

        if waiters.len() >= MAX_IN_FLIGHT {
            warn!(in_flight = waiters.len(), "Request limit reached");
            return Err(Error::protocol(format!(
                "{} requests already in flight",
                waiters.len()
            )));
        }

        let (tx, rx) = oneshot::channel();
        waiters.insert(id, tx);
        Ok(rx)
    }

    fn forget(&self, id: RequestId) {
        self.waiters.lock().remove(&id);
    }

    fn fail(&self, id: RequestId, error: Error) {
        let waiter = self.waiters.lock().remove(&id);
        if let Some(waiter) = waiter {
            let _ = waiter.send(Err(error));
        }
    }

    fn fail_all(&self) -> usize {
        let waiters: Vec<_> = self.waiters.lock().drain().collect();
        let count = waiters.len();

        for (_, waiter) in waiters {
            let _ = waiter.send(Err(Error::ConnectionClosed));
        }

        count
    }

    /// Routes one incoming text frame.
    fn route(&self, text: &str) {
        if let Ok(response) = from_str::<Response>(text) {
            let waiter = self.waiters.lock().remove(&response.id);
            match waiter {
                Some(waiter) => {
                    let _ = waiter.send(Ok(response));
                }
                None => warn!(id = %response.id, "Response matches no request"),
            }
            return;
        }

        if let Ok(event) = from_str::<Event>(text) {
            let handler = self.handler.lock();
            match handler.as_ref() {
                Some(handler) => handler(event),
                None => trace!(method = %event.method, "No subscriber for event"),
            }
            return;
        }

        warn!(%text, "Unrecognized frame");
    }
}

// ============================================================================
// Connection
// ============================================================================

/// Handle to the extension's socket.
///
/// Cheap to clone; all clones talk to the same socket task.
#[derive(Clone)]
pub struct Connection {
    outbound: mpsc::UnboundedSender<Outbound>,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

impl Connection {
    /// Spawns the socket task for an upgraded stream.
    pub(crate) fn new(ws_stream: WebSocketStream<TcpStream>) -> Self {
        let (outbound, queue) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared::default());

        tokio::spawn(run_socket(ws_stream, queue, Arc::clone(&shared)));

        Self { outbound, shared }
    }

    /// Waits for the READY frame (nil request ID).
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if READY does not arrive in time
    /// - [`Error::ConnectionClosed`] if the socket closes first
    /// - [`Error::Remote`] if the extension reports a startup failure
    pub async fn wait_ready(&self) -> Result<ReadyData> {
        let id = RequestId::ready();
        let reply = self.shared.park(id)?;

        let Ok(reply) = timeout(READY_TIMEOUT, reply).await else {
            self.shared.forget(id);
            return Err(Error::connection_timeout(READY_TIMEOUT.as_millis() as u64));
        };

        let response = reply.map_err(|_| Error::ConnectionClosed)??;
        if response.is_error() {
            response.into_result()?;
            return Err(Error::protocol("READY frame flagged as error"));
        }

        let ready = ReadyData::from_response(&response);
        debug!(
            browser = %ready.browser,
            version = %ready.version,
            family = %ready.family,
            "READY received"
        );
        Ok(ready)
    }

    /// Installs the event callback, replacing any previous one.
    pub fn set_event_handler(&self, handler: EventHandler) {
        *self.shared.handler.lock() = Some(handler);
    }

    /// Removes the event callback.
    pub fn clear_event_handler(&self) {
        self.shared.handler.lock().take();
    }

    /// Sends a request and waits up to `limit` for its response.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the socket is gone
    /// - [`Error::RequestTimeout`] if no response arrives within `limit`
    /// - [`Error::Protocol`] if too many requests are in flight
    pub async fn request(&self, request: Request, limit: Duration) -> Result<Response> {
        let id = request.id;
        let text = to_string(&request)?;
        let reply = self.shared.park(id)?;

        if self.outbound.send(Outbound::Frame { id, text }).is_err() {
            self.shared.forget(id);
            return Err(Error::ConnectionClosed);
        }

        match timeout(limit, reply).await {
            Ok(reply) => reply.map_err(|_| Error::ConnectionClosed)?,
            Err(_) => {
                self.shared.forget(id);
                Err(Error::request_timeout(id, limit.as_millis() as u64))
            }
        }
    }

    /// Closes the socket. Parked requests fail with
    /// [`Error::ConnectionClosed`].
    pub fn shutdown(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }
}

// ============================================================================
// Socket Task
// ============================================================================

async fn run_socket(
    ws_stream: WebSocketStream<TcpStream>,
    mut queue: mpsc::UnboundedReceiver<Outbound>,
    shared: Arc<Shared>,
) {
    let (mut sink, mut stream) = ws_stream.split();

    loop {
        tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => shared.route(&text),
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Extension closed the socket");
                    break;
                }
                Some(Err(e)) => {
                    error!(error = %e, "WebSocket read failed");
                    break;
                }
                // Binary, Ping, Pong
                Some(Ok(_)) => {}
            },

            queued = queue.recv() => match queued {
                Some(Outbound::Frame { id, text }) => {
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        shared.fail(id, Error::connection(e.to_string()));
                    } else {
                        trace!(request_id = %id, "Frame written");
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = sink.close().await;
                    break;
                }
            },
        }
    }

    // Refuse new frames before failing the parked callers
    queue.close();
    let failed = shared.fail_all();
    shared.handler.lock().take();

    debug!(failed, "Socket task stopped");
}

// ============================================================================
// Tests
// ============================================================================
