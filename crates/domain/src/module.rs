//! Configured module descriptors and the module kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::{HouseCode, UnitCode, X10Address};

/// One configured power-line module, as loaded from the settings store.
/// Immutable after load.
///
/// `module_type` is kept as the raw configured string so that an unknown
/// kind fails that one module's construction instead of the whole
/// configuration load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub house_code: HouseCode,
    pub unit_code: UnitCode,
    pub module_type: String,
}

impl ModuleDescriptor {
    /// The protocol address this descriptor configures.
    #[must_use]
    pub fn address(&self) -> X10Address {
        X10Address::new(self.house_code, self.unit_code)
    }

    /// Resolve the configured module type string against the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownModuleType`] when the string matches no known kind.
    pub fn module_type(&self) -> Result<ModuleType, UnknownModuleType> {
        self.module_type.parse()
    }
}

/// The kinds of X10 module the bridge knows how to model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleType {
    LampModule,
    ApplianceModule,
    OnOffSwitch,
    DimmerSwitch,
    OnOffSensor,
}

impl ModuleType {
    /// Human-readable name, also the configuration spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LampModule => "Lamp Module",
            Self::ApplianceModule => "Appliance Module",
            Self::OnOffSwitch => "On/Off Switch",
            Self::DimmerSwitch => "Dimmer Switch",
            Self::OnOffSensor => "On/Off Sensor",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleType {
    type Err = UnknownModuleType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Lamp Module" => Ok(Self::LampModule),
            "Appliance Module" => Ok(Self::ApplianceModule),
            "On/Off Switch" => Ok(Self::OnOffSwitch),
            "Dimmer Switch" => Ok(Self::DimmerSwitch),
            "On/Off Sensor" => Ok(Self::OnOffSensor),
            other => Err(UnknownModuleType {
                configured: other.to_string(),
            }),
        }
    }
}

/// The configuration references a module type the catalog does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown module type: {configured:?}")]
pub struct UnknownModuleType {
    pub configured: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_roundtrip_every_module_type_through_str() {
        for kind in [
            ModuleType::LampModule,
            ModuleType::ApplianceModule,
            ModuleType::OnOffSwitch,
            ModuleType::DimmerSwitch,
            ModuleType::OnOffSensor,
        ] {
            let parsed: ModuleType = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn should_report_unknown_module_type() {
        let err = "Toaster Module".parse::<ModuleType>().unwrap_err();
        assert_eq!(err.configured, "Toaster Module");
    }

    #[test]
    fn should_expose_address_of_descriptor() {
        let descriptor = ModuleDescriptor {
            house_code: HouseCode::new('A').unwrap(),
            unit_code: UnitCode::new(2).unwrap(),
            module_type: "On/Off Switch".to_string(),
        };
        assert_eq!(descriptor.address().to_string(), "A2");
        assert_eq!(descriptor.module_type().unwrap(), ModuleType::OnOffSwitch);
    }

    #[test]
    fn should_deserialize_descriptor_from_json() {
        let descriptor: ModuleDescriptor = serde_json::from_str(
            r#"{"house_code": "B", "unit_code": 5, "module_type": "Dimmer Switch"}"#,
        )
        .unwrap();
        assert_eq!(descriptor.address().to_string(), "B5");
        assert_eq!(descriptor.module_type().unwrap(), ModuleType::DimmerSwitch);
    }
}
