// ── Device registry reconciler ──
//
// One refresh cycle: fetch the full device list, decode it, publish the
// next registry map, then notify. Cycles are serialized by an async mutex
// and raced against a cancellation token so a shutdown discards whatever
// the in-flight fetch returns.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ReconcilerConfig;
use crate::convert::decode_device;
use crate::error::{DecodeError, RefreshError};
use crate::model::{Device, MacAddress, RegistryEvent};
use crate::notify::Notifier;
use crate::source::DataSource;
use crate::store::{DeviceRegistry, RegistrySnapshot};

/// Result of one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// At least one id was seen for the first time.
    pub any_new: bool,
    /// Ids seen for the first time.
    pub new_ids: BTreeSet<MacAddress>,
    /// Every id present in the fetch, new or pre-existing.
    pub updated_ids: BTreeSet<MacAddress>,
    /// Ids dropped by [`RemovalPolicy::Prune`](crate::RemovalPolicy::Prune).
    pub evicted_ids: BTreeSet<MacAddress>,
    /// Records skipped because they could not be decoded.
    pub decode_errors: Vec<DecodeError>,
    /// Set when the cycle made no change at all.
    pub error: Option<RefreshError>,
}

impl RefreshOutcome {
    fn failed(error: RefreshError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Owns the device registry and keeps it in step with a [`DataSource`].
pub struct DeviceRegistryReconciler {
    source: Arc<dyn DataSource>,
    notifier: Arc<dyn Notifier>,
    config: ReconcilerConfig,
    registry: DeviceRegistry,
    /// Held for the whole cycle; overlapping callers queue here.
    cycle: Mutex<()>,
    cancel: CancellationToken,
}

impl DeviceRegistryReconciler {
    pub fn new(
        source: Arc<dyn DataSource>,
        notifier: Arc<dyn Notifier>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            config,
            registry: DeviceRegistry::new(),
            cycle: Mutex::new(()),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Run one fetch-and-diff cycle.
    ///
    /// Never fails outright: fetch errors and cancellation are reported in
    /// the outcome, and the registry keeps its previous state.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _cycle = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return RefreshOutcome::failed(RefreshError::Cancelled),
            guard = self.cycle.lock() => guard,
        };

        let fetched = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("refresh cancelled while fetching");
                return RefreshOutcome::failed(RefreshError::Cancelled);
            }
            result = self.source.fetch() => result,
        };

        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                debug!(error = %e, "fetch failed; registry unchanged");
                return RefreshOutcome::failed(RefreshError::Fetch(e));
            }
        };

        let mut devices = Vec::with_capacity(records.len());
        let mut decode_errors = Vec::new();
        let mut undecoded = BTreeSet::new();
        for (index, record) in records.iter().enumerate() {
            match decode_device(index, record, &self.config.schema) {
                Ok(device) => devices.push(device),
                Err(e) => {
                    debug!(error = %e, "skipping malformed device record");
                    // Still reported by the source, so never pruned.
                    undecoded.extend(e.id().cloned());
                    decode_errors.push(e);
                }
            }
        }

        if self.cancel.is_cancelled() {
            return RefreshOutcome::failed(RefreshError::Cancelled);
        }

        let applied = self.registry.apply(devices, &undecoded, self.config.removal);
        let outcome = RefreshOutcome {
            any_new: !applied.new_ids.is_empty(),
            new_ids: applied.new_ids,
            updated_ids: applied.updated_ids,
            evicted_ids: applied.evicted_ids,
            decode_errors,
            error: None,
        };

        self.emit(&outcome);
        outcome
    }

    fn emit(&self, outcome: &RefreshOutcome) {
        if !outcome.updated_ids.is_empty() || !outcome.evicted_ids.is_empty() {
            self.notifier.notify(&RegistryEvent::DeviceListUpdated {
                ids: outcome.updated_ids.iter().cloned().collect(),
                evicted: outcome.evicted_ids.iter().cloned().collect(),
            });
        }
        if outcome.any_new {
            self.notifier.notify(&RegistryEvent::NewDeviceDiscovered {
                ids: outcome.new_ids.iter().cloned().collect(),
            });
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn get(&self, id: &MacAddress) -> Option<Arc<Device>> {
        self.registry.get(id)
    }

    /// Look up by any MAC spelling. Unparseable input is simply absent.
    pub fn get_str(&self, id: &str) -> Option<Arc<Device>> {
        MacAddress::parse(id).ok().and_then(|mac| self.get(&mac))
    }

    /// Every known device, sorted by id, as of the call.
    pub fn all(&self) -> Vec<Arc<Device>> {
        self.registry.snapshot().to_sorted_vec()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.registry.last_refresh()
    }

    pub fn subscribe_refreshes(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.registry.subscribe_refreshes()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Cancel any in-flight cycle and refuse future ones.
    ///
    /// Returns once no cycle can still publish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let _cycle = self.cycle.lock().await;
        debug!("reconciler shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token cancelled by [`shutdown`](Self::shutdown); drivers derive
    /// child tokens from it.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Drop for DeviceRegistryReconciler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
