// ── Refresh application logic ──
//
// Applies one fetched device list to the registry. Incoming devices fully
// replace stored ones (no field merge). Under `Retain` the previous map is
// the starting point, so unreported ids survive; under `Prune` the next map
// starts empty and only reported ids remain. Ids whose record was reported
// but failed to decode keep their previous entry under both policies.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use super::DeviceRegistry;
use super::snapshot::DeviceMap;
use crate::config::RemovalPolicy;
use crate::model::{Device, MacAddress};

/// Id sets produced by applying one fetch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Applied {
    pub new_ids: BTreeSet<MacAddress>,
    pub updated_ids: BTreeSet<MacAddress>,
    pub evicted_ids: BTreeSet<MacAddress>,
}

impl DeviceRegistry {
    /// Build the next map from `devices` and publish it atomically.
    ///
    /// `undecoded` holds ids the source reported whose records could not be
    /// decoded; they are never evicted.
    ///
    /// Must only be called by the single writer; the load-then-store pair
    /// is not a compare-and-swap.
    pub(crate) fn apply(
        &self,
        devices: Vec<Device>,
        undecoded: &BTreeSet<MacAddress>,
        removal: RemovalPolicy,
    ) -> Applied {
        let current = self.devices.load_full();
        let mut next: DeviceMap = match removal {
            RemovalPolicy::Retain => (*current).clone(),
            RemovalPolicy::Prune => DeviceMap::with_capacity(devices.len()),
        };
        let mut applied = Applied::default();

        for device in devices {
            if !current.contains_key(&device.id) {
                applied.new_ids.insert(device.id.clone());
            }
            applied.updated_ids.insert(device.id.clone());
            next.insert(device.id.clone(), Arc::new(device));
        }

        if removal == RemovalPolicy::Prune {
            for id in undecoded {
                if let Some(previous) = current.get(id) {
                    next.entry(id.clone()).or_insert_with(|| Arc::clone(previous));
                }
            }
            applied.evicted_ids = current
                .keys()
                .filter(|id| !next.contains_key(*id))
                .cloned()
                .collect();
        }

        self.devices.store(Arc::new(next));
        self.last_refresh.send_replace(Some(Utc::now()));

        applied
    }
}
