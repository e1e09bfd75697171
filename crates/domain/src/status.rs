//! Status events and the static function-to-property rule table.
//!
//! The power line is a shared medium: a status event may address several
//! units at once, and function codes outside the known set must be ignored
//! rather than rejected (forward compatibility with protocol extensions).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::X10Address;
use crate::property::{InboundEffect, PropertyName, StepSign};

/// Protocol function code reported in a unit-status event.
///
/// Unknown codes are carried verbatim in [`X10Function::Unrecognized`]; they
/// match no rule and are dropped by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum X10Function {
    On,
    Off,
    Dim,
    Bright,
    Unrecognized(String),
}

impl X10Function {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Dim => "DIM",
            Self::Bright => "BRIGHT",
            Self::Unrecognized(code) => code,
        }
    }
}

impl From<String> for X10Function {
    fn from(code: String) -> Self {
        match code.as_str() {
            "ON" => Self::On,
            "OFF" => Self::Off,
            "DIM" => Self::Dim,
            "BRIGHT" => Self::Bright,
            _ => Self::Unrecognized(code),
        }
    }
}

impl From<X10Function> for String {
    fn from(function: X10Function) -> Self {
        function.as_str().to_string()
    }
}

impl fmt::Display for X10Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asynchronous status report from the power line.
///
/// `magnitude` is a relative step count, meaningful only for dim/bright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub function: X10Function,
    pub units: Vec<X10Address>,
    pub magnitude: u8,
}

/// How a recognized status function acts on device properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule {
    /// Which property the rule targets.
    pub target: PropertyName,
    /// What it does to that property.
    pub effect: InboundEffect,
}

/// Resolve the rule for a function code. `None` for unrecognized codes —
/// not an error.
#[must_use]
pub fn rule_for(function: &X10Function) -> Option<StatusRule> {
    match function {
        X10Function::On => Some(StatusRule {
            target: PropertyName::On,
            effect: InboundEffect::Assign(true),
        }),
        X10Function::Off => Some(StatusRule {
            target: PropertyName::On,
            effect: InboundEffect::Assign(false),
        }),
        X10Function::Dim => Some(StatusRule {
            target: PropertyName::Level,
            effect: InboundEffect::Step(StepSign::Down),
        }),
        X10Function::Bright => Some(StatusRule {
            target: PropertyName::Level,
            effect: InboundEffect::Step(StepSign::Up),
        }),
        X10Function::Unrecognized(_) => None,
    }
}
