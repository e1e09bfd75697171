//! Device aggregate — one power-line module and its reconciled properties.
//!
//! The aggregate owns both directions of translation:
//!
//! * an outbound property write ([`X10Device::set_property`]) yields the
//!   resolved value plus the protocol commands that realise it;
//! * an inbound status rule ([`X10Device::handle_status`]) yields a property
//!   change only when the resolved value differs, and never any commands.
//!
//! The `on` property gates level transmission: the composite state space is
//! `{Off, On × Level}` and level transitions transmit only while on.

use std::collections::BTreeMap;

use crate::address::{DeviceId, X10Address};
use crate::catalog::{self, Capability, DeviceTypeTemplate};
use crate::command::Command;
use crate::error::X10HubError;
use crate::module::{ModuleDescriptor, UnknownModuleType};
use crate::property::{
    DimDirection, Property, PropertyName, PropertyValue, steps_for_percent_delta,
};
use crate::status::StatusRule;

/// One property-changed notification, as produced by the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub property: PropertyName,
    pub value: PropertyValue,
}

/// Result of an outbound property write: the notification to emit (always
/// exactly one) and the commands to issue (possibly none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub change: PropertyChange,
    pub commands: Vec<Command>,
}

/// A device modelling one configured power-line module.
#[derive(Debug, Clone)]
pub struct X10Device {
    id: DeviceId,
    address: X10Address,
    name: String,
    device_class: &'static str,
    capabilities: &'static [Capability],
    properties: BTreeMap<PropertyName, Property>,
}

impl X10Device {
    /// Build a device from a catalog template at the given address.
    #[must_use]
    pub fn from_template(template: &DeviceTypeTemplate, address: X10Address) -> Self {
        let properties = template
            .properties
            .iter()
            .map(|tpl| (tpl.name, tpl.instantiate()))
            .collect();

        Self {
            id: address.device_id(),
            address,
            name: format!("X10 {} ({address})", template.display_name),
            device_class: template.device_class,
            capabilities: template.capabilities,
            properties,
        }
    }

    /// Build a device from a configured module descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownModuleType`] when the descriptor names a module type
    /// the catalog does not register.
    pub fn from_descriptor(descriptor: &ModuleDescriptor) -> Result<Self, UnknownModuleType> {
        let module_type = descriptor.module_type()?;
        Ok(Self::from_template(
            catalog::template(module_type),
            descriptor.address(),
        ))
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    #[must_use]
    pub fn address(&self) -> X10Address {
        self.address
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn device_class(&self) -> &'static str {
        self.device_class
    }

    #[must_use]
    pub fn capabilities(&self) -> &'static [Capability] {
        self.capabilities
    }

    #[must_use]
    pub fn property(&self, name: PropertyName) -> Option<&Property> {
        self.properties.get(&name)
    }

    /// Iterate over the device's properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.values()
    }

    fn is_on(&self) -> bool {
        matches!(
            self.property(PropertyName::On).map(Property::value),
            Some(PropertyValue::Bool(true))
        )
    }

    fn level(&self) -> Option<u8> {
        match self.property(PropertyName::Level).map(Property::value) {
            Some(PropertyValue::Percent(level)) => Some(level),
            _ => None,
        }
    }

    /// Apply an outbound property write and derive the protocol commands.
    ///
    /// Always produces exactly one notification, even when the value did
    /// not change. Command dispatch:
    ///
    /// * `on = true` — `TurnOn`, plus a compensating `Dim` when a level
    ///   property exists below 100% (the protocol has no "set absolute
    ///   level then power on").
    /// * `on = false` — `TurnOff`.
    /// * `level` — one `Bright`/`Dim` per the recorded adjustment, but only
    ///   while the device is on; level writes while off are recorded and
    ///   not transmitted.
    ///
    /// # Errors
    ///
    /// [`X10HubError::UnknownProperty`] when the device does not expose the
    /// property; [`X10HubError::ValueMismatch`] when the value shape does
    /// not fit it.
    pub fn set_property(
        &mut self,
        name: PropertyName,
        value: PropertyValue,
    ) -> Result<WriteOutcome, X10HubError> {
        let property = self
            .properties
            .get_mut(&name)
            .ok_or_else(|| X10HubError::UnknownProperty {
                device: self.id.clone(),
                property: name,
            })?;

        let resolved =
            property
                .apply_outbound(value)
                .ok_or_else(|| X10HubError::ValueMismatch {
                    device: self.id.clone(),
                    property: name,
                })?;

        let commands = match (name, resolved) {
            (PropertyName::On, PropertyValue::Bool(true)) => {
                let mut commands = vec![Command::TurnOn(self.address)];
                if let Some(level) = self.level()
                    && level < 100
                {
                    commands.push(Command::Dim(
                        self.address,
                        steps_for_percent_delta(100 - level),
                    ));
                }
                commands
            }
            (PropertyName::On, PropertyValue::Bool(false)) => {
                vec![Command::TurnOff(self.address)]
            }
            (PropertyName::Level, _) if self.is_on() => {
                let adjust = self
                    .property(PropertyName::Level)
                    .and_then(Property::adjust)
                    .copied();
                match adjust {
                    Some(adjust) => vec![match adjust.direction {
                        DimDirection::Bright => Command::Bright(self.address, adjust.amount),
                        DimDirection::Dim => Command::Dim(self.address, adjust.amount),
                    }],
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        };

        Ok(WriteOutcome {
            change: PropertyChange {
                property: name,
                value: resolved,
            },
            commands,
        })
    }

    /// Apply an inbound status rule.
    ///
    /// Devices that do not expose the rule's target property ignore it.
    /// Returns the change to notify only when the resolved value differs
    /// from the cached one; never issues commands.
    pub fn handle_status(&mut self, rule: StatusRule, magnitude: u8) -> Option<PropertyChange> {
        let property = self.properties.get_mut(&rule.target)?;
        let outcome = property.apply_inbound(rule.effect, magnitude);

        outcome.changed.then_some(PropertyChange {
            property: rule.target,
            value: outcome.value,
        })
    }
}
