//! Property-changed notification bus backed by a tokio broadcast channel.
//!
//! The device-graph host subscribes here; the bridge controller publishes
//! one notification per outbound write (always) and per effective inbound
//! change (only when the value moved).

use tokio::sync::broadcast;

use x10hub_domain::address::DeviceId;
use x10hub_domain::property::{PropertyName, PropertyValue};
use x10hub_domain::time::Timestamp;

/// One property-changed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChanged {
    pub device_id: DeviceId,
    pub property: PropertyName,
    pub value: PropertyValue,
    pub timestamp: Timestamp,
}

/// In-process notification bus.
///
/// Publishing succeeds even when there are no active subscribers
/// (the notification is simply dropped).
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<PropertyChanged>,
}

impl NotificationBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to notifications published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PropertyChanged> {
        self.sender.subscribe()
    }

    /// Publish a notification.
    pub fn publish(&self, notification: PropertyChanged) {
        // broadcast::send fails only when there are zero receivers,
        // which is fine — we simply ignore the error.
        let _ = self.sender.send(notification);
    }
}
