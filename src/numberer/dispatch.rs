//! Event loop driving a [`TabNumberer`].

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::host::TabHost;
use crate::protocol::TabEvent;

use super::core::TabNumberer;
use super::outcome::{EventOutcome, RemovalOutcome};

// ============================================================================
// Event Loop
// ============================================================================

/// Numbers every tab once, then reacts to events until the channel closes.
///
/// Each event is handled on its own task, so a removal that takes many
/// polls to confirm does not hold up other events. Once the channel
/// closes, the loop waits for in-flight handlers before returning.
///
/// # Errors
///
/// Returns an error if the initial resync cannot fetch the tab list.
pub async fn run<H>(
    numberer: Arc<TabNumberer<H>>,
    mut events: mpsc::UnboundedReceiver<TabEvent>,
) -> Result<()>
where
    H: TabHost + ?Sized + 'static,
{
    let report = numberer.update_all().await?;
    info!(
        tabs = report.len(),
        capacity = %numberer.capacity(),
        "Initial numbering complete"
    );

    let mut handlers = JoinSet::new();

    while let Some(event) = events.recv().await {
        let numberer = Arc::clone(&numberer);
        handlers.spawn(async move {
            let method = event.method().to_string();
            match numberer.handle(event).await {
                Ok(outcome) => log_outcome(&method, &outcome),
                Err(error) => warn!(%method, %error, "Event handling failed"),
            }
        });

        // Reap finished handlers
        while handlers.try_join_next().is_some() {}
    }

    debug!(in_flight = handlers.len(), "Event stream closed");
    while handlers.join_next().await.is_some() {}

    info!("Numbering stopped");
    Ok(())
}

fn log_outcome(method: &str, outcome: &EventOutcome) {
    match outcome {
        EventOutcome::Resynced(report) => {
            debug!(method, retitled = report.retitled(), failed = report.failed(), "Event handled");
        }
        EventOutcome::Removal(RemovalOutcome::Confirmed { polls, report }) => {
            debug!(method, polls, retitled = report.retitled(), "Event handled");
        }
        EventOutcome::Removal(RemovalOutcome::Abandoned { polls }) => {
            debug!(method, polls, "Removal not confirmed");
        }
        EventOutcome::Updated { .. } | EventOutcome::Ignored => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
