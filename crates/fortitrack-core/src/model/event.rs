// ── Registry change events ──

use serde::Serialize;
use strum::IntoStaticStr;

use super::mac::MacAddress;

/// Change notification emitted after a successful refresh cycle.
///
/// Ids are sorted. Consumers re-read the registry for state; events only
/// say *which* devices changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, IntoStaticStr)]
#[serde(tag = "event", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegistryEvent {
    /// Every id present in the fetch, plus any ids pruned by the removal
    /// policy.
    DeviceListUpdated {
        ids: Vec<MacAddress>,
        evicted: Vec<MacAddress>,
    },
    /// Ids seen for the first time in this cycle.
    NewDeviceDiscovered { ids: Vec<MacAddress> },
}

impl RegistryEvent {
    /// Stable snake_case event name (`device_list_updated`, ...).
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Dispatcher signal name scoped to one firewall,
    /// e.g. `fortios-192.168.1.1-device-new`.
    pub fn signal(&self, namespace: &str) -> String {
        match self {
            Self::DeviceListUpdated { .. } => format!("{namespace}-device-update"),
            Self::NewDeviceDiscovered { .. } => format!("{namespace}-device-new"),
        }
    }

    pub fn ids(&self) -> &[MacAddress] {
        match self {
            Self::DeviceListUpdated { ids, .. } | Self::NewDeviceDiscovered { ids } => ids,
        }
    }
}
