//! Device registry — the single table of constructed devices.
//!
//! Owned exclusively by the bridge controller's dispatch loop; keyed by the
//! deterministic device id. Insertion is idempotent so configuration
//! re-scans skip already-present devices instead of erroring.

use std::collections::HashMap;

use x10hub_domain::address::DeviceId;
use x10hub_domain::device::X10Device;

/// Result of an insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Added,
    AlreadyPresent,
}

/// Registry of devices, indexed by device id.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: HashMap<DeviceId, X10Device>,
}

impl DeviceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a device unless its id is already registered.
    pub fn insert(&mut self, device: X10Device) -> InsertOutcome {
        let id = device.id().clone();
        if self.devices.contains_key(&id) {
            return InsertOutcome::AlreadyPresent;
        }
        self.devices.insert(id, device);
        InsertOutcome::Added
    }

    #[must_use]
    pub fn contains(&self, id: &DeviceId) -> bool {
        self.devices.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<&X10Device> {
        self.devices.get(id)
    }

    pub fn get_mut(&mut self, id: &DeviceId) -> Option<&mut X10Device> {
        self.devices.get_mut(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate over all registered devices (unspecified order).
    pub fn iter(&self) -> impl Iterator<Item = &X10Device> {
        self.devices.values()
    }
}
