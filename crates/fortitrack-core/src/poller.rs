// ── Periodic refresh driver ──

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::RefreshError;
use crate::reconciler::{DeviceRegistryReconciler, RefreshOutcome};

/// Shortest accepted poll period.
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Background task calling [`DeviceRegistryReconciler::refresh`] on a
/// fixed period.
pub struct Poller {
    reconciler: Arc<DeviceRegistryReconciler>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling. The first refresh runs immediately.
    ///
    /// Periods below [`MIN_PERIOD`] are raised to it.
    pub fn spawn(reconciler: Arc<DeviceRegistryReconciler>, period: Duration) -> Self {
        let period = period.max(MIN_PERIOD);
        let cancel = reconciler.cancellation_token().child_token();
        let handle = tokio::spawn(poll_task(
            Arc::clone(&reconciler),
            period,
            cancel.clone(),
        ));
        debug!(period_secs = period.as_secs(), "poller started");

        Self {
            reconciler,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn reconciler(&self) -> &Arc<DeviceRegistryReconciler> {
        &self.reconciler
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the loop, discard any in-flight fetch, and wait for the task.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        self.reconciler.shutdown().await;
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "poller task ended abnormally");
            }
        }
        debug!("poller stopped");
    }
}

/// Dropping the poller stops the loop and abandons any in-flight fetch
/// without publishing it. The reconciler itself stays usable.
impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_task(
    reconciler: Arc<DeviceRegistryReconciler>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut failing = false;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        // Dropping `refresh` at its fetch await discards the result; the
        // registry is only written after the fetch completes.
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            outcome = reconciler.refresh() => outcome,
        };
        failing = log_outcome(&outcome, failing);
    }
}

/// Log one cycle. Returns whether the source is currently failing so a
/// recovery can be reported once.
fn log_outcome(outcome: &RefreshOutcome, was_failing: bool) -> bool {
    match &outcome.error {
        Some(RefreshError::Cancelled) => was_failing,
        Some(RefreshError::Fetch(e)) => {
            warn!(error = %e, "device refresh failed; keeping previous registry");
            true
        }
        None => {
            if was_failing {
                info!("device source reachable again");
            }
            if outcome.any_new {
                info!(count = outcome.new_ids.len(), "discovered new devices");
            }
            if !outcome.evicted_ids.is_empty() {
                info!(count = outcome.evicted_ids.len(), "evicted devices");
            }
            if !outcome.decode_errors.is_empty() {
                warn!(
                    skipped = outcome.decode_errors.len(),
                    "some device records could not be decoded"
                );
            }
            debug!(devices = outcome.updated_ids.len(), "device refresh complete");
            false
        }
    }
}
