//! Device type catalog — the static registry of module capabilities.
//!
//! Every [`ModuleType`] maps to exactly one [`DeviceTypeTemplate`], which
//! lists the properties the module exposes together with defaults and host
//! metadata. Pure lookup, no state.

use serde::Serialize;

use crate::module::ModuleType;
use crate::property::{Property, PropertyMetadata, PropertyName, PropertyValue};

/// Capability tags consumed by the device-graph host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Capability {
    OnOffSwitch,
    Light,
    MultiLevelSwitch,
    BinarySensor,
}

/// Blueprint for one property of a module kind.
#[derive(Debug, Clone, Copy)]
pub struct PropertyTemplate {
    pub name: PropertyName,
    pub default: PropertyValue,
    pub metadata: PropertyMetadata,
}

impl PropertyTemplate {
    /// Instantiate a fresh [`Property`] carrying this template's default
    /// value and metadata.
    #[must_use]
    pub fn instantiate(&self) -> Property {
        match (self.name, self.default) {
            (PropertyName::On, PropertyValue::Bool(value)) => {
                Property::on_off(value, self.metadata)
            }
            (PropertyName::Level, PropertyValue::Percent(value)) => {
                Property::level(value.min(100), self.metadata)
            }
            // Defaults are declared next to their names below; a mismatch
            // cannot be represented in configuration.
            (PropertyName::On, PropertyValue::Percent(_)) => Property::on_off(false, self.metadata),
            (PropertyName::Level, PropertyValue::Bool(_)) => Property::level(100, self.metadata),
        }
    }
}

/// Static description of one module kind.
#[derive(Debug, Clone, Copy)]
pub struct DeviceTypeTemplate {
    /// Human-readable name, used when composing device display names.
    pub display_name: &'static str,
    /// Capability tags for the host.
    pub capabilities: &'static [Capability],
    /// Legacy device class string.
    pub device_class: &'static str,
    /// Ordered property blueprints.
    pub properties: &'static [PropertyTemplate],
}

const ON: PropertyTemplate = PropertyTemplate {
    name: PropertyName::On,
    default: PropertyValue::Bool(false),
    metadata: PropertyMetadata {
        semantic_type: "OnOffProperty",
        label: Some("On/Off"),
        value_type: "boolean",
        unit: None,
    },
};

const SENSED: PropertyTemplate = PropertyTemplate {
    name: PropertyName::On,
    default: PropertyValue::Bool(false),
    metadata: PropertyMetadata {
        semantic_type: "BooleanProperty",
        label: None,
        value_type: "boolean",
        unit: None,
    },
};

const BRIGHTNESS: PropertyTemplate = PropertyTemplate {
    name: PropertyName::Level,
    default: PropertyValue::Percent(100),
    metadata: PropertyMetadata {
        semantic_type: "BrightnessProperty",
        label: Some("Brightness"),
        value_type: "number",
        unit: Some("percent"),
    },
};

const LEVEL: PropertyTemplate = PropertyTemplate {
    name: PropertyName::Level,
    default: PropertyValue::Percent(100),
    metadata: PropertyMetadata {
        semantic_type: "LevelProperty",
        label: Some("Level"),
        value_type: "number",
        unit: Some("percent"),
    },
};

const LAMP_MODULE: DeviceTypeTemplate = DeviceTypeTemplate {
    display_name: "Lamp Module",
    capabilities: &[Capability::OnOffSwitch, Capability::Light],
    device_class: "dimmableLight",
    properties: &[ON, BRIGHTNESS],
};

const APPLIANCE_MODULE: DeviceTypeTemplate = DeviceTypeTemplate {
    display_name: "Appliance Module",
    capabilities: &[Capability::OnOffSwitch, Capability::Light],
    device_class: "onOffLight",
    properties: &[ON],
};

const ON_OFF_SWITCH: DeviceTypeTemplate = DeviceTypeTemplate {
    display_name: "On/Off Switch",
    capabilities: &[Capability::OnOffSwitch],
    device_class: "onOffSwitch",
    properties: &[ON],
};

const DIMMER_SWITCH: DeviceTypeTemplate = DeviceTypeTemplate {
    display_name: "Dimmer Switch",
    capabilities: &[Capability::OnOffSwitch, Capability::MultiLevelSwitch],
    device_class: "multiLevelSwitch",
    properties: &[ON, LEVEL],
};

const ON_OFF_SENSOR: DeviceTypeTemplate = DeviceTypeTemplate {
    display_name: "On/Off Sensor",
    capabilities: &[Capability::BinarySensor],
    device_class: "binarySensor",
    properties: &[SENSED],
};

/// Look up the template for a module kind.
#[must_use]
pub fn template(module_type: ModuleType) -> &'static DeviceTypeTemplate {
    match module_type {
        ModuleType::LampModule => &LAMP_MODULE,
        ModuleType::ApplianceModule => &APPLIANCE_MODULE,
        ModuleType::OnOffSwitch => &ON_OFF_SWITCH,
        ModuleType::DimmerSwitch => &DIMMER_SWITCH,
        ModuleType::OnOffSensor => &ON_OFF_SENSOR,
    }
}
