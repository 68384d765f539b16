// ── Device registry ──
//
// Wait-free reads through an `ArcSwap`ed immutable map. A refresh builds
// the next map off to the side and publishes it with a single store, so
// readers see either the old or the new map and never a mix.

mod refresh;
mod snapshot;

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Device, MacAddress};

pub use snapshot::RegistrySnapshot;

use snapshot::DeviceMap;

/// In-memory mapping of every known device, keyed by MAC address.
///
/// Single writer (the reconciler's refresh cycle), any number of readers.
pub struct DeviceRegistry {
    devices: ArcSwap<DeviceMap>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);
        Self {
            devices: ArcSwap::from_pointee(DeviceMap::new()),
            last_refresh,
        }
    }

    pub fn get(&self, id: &MacAddress) -> Option<Arc<Device>> {
        self.devices.load().get(id).cloned()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::new(self.devices.load_full())
    }

    pub fn len(&self) -> usize {
        self.devices.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.load().is_empty()
    }

    /// Time of the last successful refresh, if any.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// Observe successful refresh times.
    pub fn subscribe_refreshes(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_refresh.subscribe()
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
