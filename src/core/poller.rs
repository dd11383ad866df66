//! Bounded-time polling of remote operations.
//!
//! Drives a pending operation to a terminal state or reports a timeout.
//! Transient status-fetch failures are logged and retried; a definitive
//! `Failed` status from the service stops polling immediately.

use std::cmp;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use crate::adapters::AnalysisBackend;
use crate::domain::{Operation, OperationStatus};

/// Timing parameters for one poll call.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Hard wall-clock bound for the whole wait.
    pub max_wait: Duration,

    /// Delay between consecutive status fetches.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(300),
            interval: Duration::from_secs(2),
        }
    }
}

/// Terminal outcomes of a poll that did not succeed.
///
/// `TimedOut` and `Cancelled` both leave the operation running remotely;
/// the handle they carry stays valid for a later out-of-band check.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("operation {handle} failed ({code}): {message}")]
    OperationFailed {
        handle: String,
        code: String,
        message: String,
    },

    #[error("timed out waiting for operation {handle}")]
    TimedOut { handle: String },

    #[error("cancelled while waiting for operation {handle}")]
    Cancelled { handle: String },
}

/// Polls one operation handle until it reaches a terminal state.
pub struct OperationPoller {
    backend: Arc<dyn AnalysisBackend>,
    settings: PollSettings,
}

impl OperationPoller {
    /// Create a poller over the given status-fetch capability.
    pub fn new(backend: Arc<dyn AnalysisBackend>, settings: PollSettings) -> Self {
        Self { backend, settings }
    }

    /// Wait for the operation to succeed, with no external cancellation.
    pub async fn wait_for_completion(&self, handle: &str) -> Result<Operation, PollError> {
        // Never-signalled channel; the sleep arm always wins the select.
        let (_tx, mut rx) = watch::channel(false);
        self.wait_with_shutdown(handle, &mut rx).await
    }

    /// Wait for the operation to succeed, aborting promptly when `shutdown`
    /// flips to `true`.
    pub async fn wait_with_shutdown(
        &self,
        handle: &str,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<Operation, PollError> {
        if *shutdown.borrow() {
            return Err(PollError::Cancelled {
                handle: handle.to_string(),
            });
        }

        let deadline = Instant::now() + self.settings.max_wait;

        while Instant::now() < deadline {
            match self.backend.fetch_status(handle).await {
                Ok(snapshot) => match snapshot.status {
                    OperationStatus::Succeeded => {
                        debug!(handle, "operation succeeded");
                        return Ok(snapshot);
                    }
                    OperationStatus::Failed => {
                        return Err(PollError::OperationFailed {
                            handle: handle.to_string(),
                            code: snapshot
                                .failure_code
                                .unwrap_or_else(|| "Unknown".to_string()),
                            message: snapshot
                                .failure_message
                                .unwrap_or_else(|| "None".to_string()),
                        });
                    }
                    status => {
                        debug!(handle, ?status, "operation still in progress");
                    }
                },
                Err(e) => {
                    // Transient fetch failures never end the poll early.
                    warn!(handle, error = %e, "status fetch failed, will retry");
                }
            }

            let wake = cmp::min(deadline, Instant::now() + self.settings.interval);
            tokio::select! {
                _ = sleep_until(wake) => {}
                changed = shutdown.changed() => match changed {
                    Ok(()) if *shutdown.borrow() => {
                        return Err(PollError::Cancelled {
                            handle: handle.to_string(),
                        });
                    }
                    // Spurious flip back to false: go around the loop.
                    Ok(()) => {}
                    // Sender dropped; finish the wait undisturbed.
                    Err(_) => sleep_until(wake).await,
                },
            }
        }

        Err(PollError::TimedOut {
            handle: handle.to_string(),
        })
    }
}
