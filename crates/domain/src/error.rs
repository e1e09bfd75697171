//! Common error types used across the workspace.

use crate::address::{AddressParseError, DeviceId};
use crate::module::UnknownModuleType;
use crate::property::PropertyName;

/// Top-level error for the x10hub workspace.
///
/// Each layer defines its own typed errors and converts via `#[from]`.
/// Deliberate non-errors (duplicate device ids on re-scan, unrecognized
/// status functions, status events addressed to unregistered units) never
/// surface here; they are handled in place.
#[derive(Debug, thiserror::Error)]
pub enum X10HubError {
    /// Configuration referenced a module type the catalog does not know.
    /// Fatal to that module's construction only.
    #[error("module configuration rejected")]
    UnknownModuleType(#[from] UnknownModuleType),

    /// An address string could not be interpreted.
    #[error("invalid X10 address")]
    Address(#[from] AddressParseError),

    /// A property write targeted a property the device does not expose.
    #[error("device {device} has no property {property}")]
    UnknownProperty {
        device: DeviceId,
        property: PropertyName,
    },

    /// A property write carried a value of the wrong shape (boolean for a
    /// level property or vice versa).
    #[error("value shape does not match property {property} on device {device}")]
    ValueMismatch {
        device: DeviceId,
        property: PropertyName,
    },

    /// A write targeted a device id that is not registered.
    #[error("no device registered with id {0}")]
    DeviceNotFound(DeviceId),

    /// The transport collaborator failed; propagated as adapter
    /// initialization/shutdown failure.
    #[error("transport failure")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn should_wrap_unknown_module_type() {
        let err: X10HubError = crate::module::ModuleType::from_str("bogus")
            .unwrap_err()
            .into();
        assert!(matches!(err, X10HubError::UnknownModuleType(_)));
    }

    #[test]
    fn should_wrap_address_parse_error() {
        let err: X10HubError = "Z9".parse::<crate::address::X10Address>().unwrap_err().into();
        assert!(matches!(err, X10HubError::Address(_)));
    }
}
