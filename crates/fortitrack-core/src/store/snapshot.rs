// ── Immutable registry snapshot ──

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{Device, MacAddress};

pub(crate) type DeviceMap = HashMap<MacAddress, Arc<Device>>;

/// A point-in-time view of the registry.
///
/// Cheap to clone (one `Arc`). Never changes after it is taken, even if a
/// refresh publishes a newer map in the meantime.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    devices: Arc<DeviceMap>,
}

impl RegistrySnapshot {
    pub(crate) fn new(devices: Arc<DeviceMap>) -> Self {
        Self { devices }
    }

    pub fn get(&self, id: &MacAddress) -> Option<Arc<Device>> {
        self.devices.get(id).cloned()
    }

    pub fn contains(&self, id: &MacAddress) -> bool {
        self.devices.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Unordered iteration.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.devices.values()
    }

    /// All devices, sorted by id.
    pub fn to_sorted_vec(&self) -> Vec<Arc<Device>> {
        let mut out: Vec<Arc<Device>> = self.devices.values().cloned().collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// All ids, sorted.
    pub fn ids(&self) -> Vec<MacAddress> {
        let mut ids: Vec<MacAddress> = self.devices.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl PartialEq for RegistrySnapshot {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.devices, &other.devices)
            || (self.devices.len() == other.devices.len()
                && self
                    .devices
                    .iter()
                    .all(|(k, v)| other.devices.get(k).is_some_and(|o| **o == **v)))
    }
}
