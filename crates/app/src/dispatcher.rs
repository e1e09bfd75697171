//! Status dispatcher — fans incoming unit-status events out to devices.
//!
//! The power line is shared: a status event may address units the bridge
//! does not model, and may carry function codes it does not recognise.
//! Neither case is an error; both are skipped (the unit silently, the
//! function with a debug log for visibility).

use x10hub_domain::address::DeviceId;
use x10hub_domain::device::PropertyChange;
use x10hub_domain::status::{StatusEvent, rule_for};

use crate::registry::DeviceRegistry;

/// Apply one status event to every addressed, registered device.
///
/// Returns the property changes that actually occurred, in unit order —
/// the caller turns these into notifications. Devices whose resolved value
/// did not change produce nothing.
pub fn dispatch(
    registry: &mut DeviceRegistry,
    event: &StatusEvent,
) -> Vec<(DeviceId, PropertyChange)> {
    let Some(rule) = rule_for(&event.function) else {
        tracing::debug!(function = %event.function, "ignoring unrecognized status function");
        return Vec::new();
    };

    let mut changes = Vec::new();
    for unit in &event.units {
        let id = unit.device_id();
        let Some(device) = registry.get_mut(&id) else {
            // Not locally modelled; the line addresses every listener.
            continue;
        };

        if let Some(change) = device.handle_status(rule, event.magnitude) {
            tracing::debug!(
                device = %id,
                property = %change.property,
                value = %change.value,
                "status update applied"
            );
            changes.push((id, change));
        }
    }
    changes
}
