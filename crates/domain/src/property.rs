//! Property reconciliation — the per-property state machine.
//!
//! Every property value moves through exactly two paths:
//!
//! * **outbound** ([`Property::apply_outbound`]) — a user/system write.
//!   Caches the value, recomputes the relative dim/bright bookkeeping for
//!   level properties, and always signals a notification (the notification
//!   is what drives protocol command dispatch in the device aggregate).
//! * **inbound** ([`Property::apply_inbound`]) — a protocol-origin status
//!   update. Overwrites (on/off) or applies a clamped delta (level) and
//!   signals a notification only when the resolved value actually changed,
//!   so protocol truth never re-enters the command path.
//!
//! The asymmetry (outbound always notifies, even unchanged; inbound
//! suppresses no-ops) is intentional and matches the legacy behaviour.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Maximum relative adjustment the protocol can express in one command.
pub const MAX_DIM_STEPS: u8 = 22;

/// Convert an absolute percentage delta (0–100) into protocol steps (0–22),
/// rounding half up.
#[must_use]
pub fn steps_for_percent_delta(delta: u8) -> u8 {
    let steps = (u16::from(delta) * u16::from(MAX_DIM_STEPS) + 50) / 100;
    u8::try_from(steps).unwrap_or(MAX_DIM_STEPS)
}

/// Clamp an arithmetic result into the 0–100 percentage range.
#[must_use]
pub fn clamp_percent(value: i16) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(0)
}

/// The property names a module can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyName {
    On,
    Level,
}

impl PropertyName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Level => "level",
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyName {
    type Err = UnknownPropertyName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "level" => Ok(Self::Level),
            other => Err(UnknownPropertyName(other.to_string())),
        }
    }
}

/// A property name string the bridge does not model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property name: {0:?}")]
pub struct UnknownPropertyName(pub String);

/// A property value, either a boolean or a percentage level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Percent(u8),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => value.fmt(f),
            Self::Percent(value) => value.fmt(f),
        }
    }
}

/// Direction of a relative level adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DimDirection {
    Bright,
    Dim,
}

/// Outbound-only bookkeeping for a level property: what relative command
/// would realise the most recent absolute write.
///
/// Inbound updates never touch this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimAdjust {
    pub previous_level: u8,
    pub direction: DimDirection,
    pub amount: u8,
}

impl DimAdjust {
    #[must_use]
    pub fn new(initial_level: u8) -> Self {
        Self {
            previous_level: initial_level,
            direction: DimDirection::Bright,
            amount: 0,
        }
    }

    /// Record an absolute write: compute the step count and direction that
    /// move from the previous level to `new_level`.
    pub fn record(&mut self, new_level: u8) {
        let delta = new_level.abs_diff(self.previous_level);
        self.amount = steps_for_percent_delta(delta);
        self.direction = if new_level >= self.previous_level {
            DimDirection::Bright
        } else {
            DimDirection::Dim
        };
        self.previous_level = new_level;
    }
}

/// Descriptive metadata carried on a property for the device-graph host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertyMetadata {
    /// Semantic capability tag, e.g. `OnOffProperty` or `BrightnessProperty`.
    pub semantic_type: &'static str,
    /// Display label, if the host should show one.
    pub label: Option<&'static str>,
    /// Primitive value type, `boolean` or `number`.
    pub value_type: &'static str,
    /// Unit of measure for numeric properties.
    pub unit: Option<&'static str>,
}

/// Value state, tagged by property shape rather than dispatched on a name
/// string at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    OnOff { value: bool },
    Level { value: u8, adjust: DimAdjust },
}

/// One reconciled property of a device.
#[derive(Debug, Clone)]
pub struct Property {
    metadata: PropertyMetadata,
    kind: PropertyKind,
}

/// Outcome of an inbound update: the resolved value, and whether it differs
/// from the previously cached one (only then must the caller notify).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundOutcome {
    pub value: PropertyValue,
    pub changed: bool,
}

impl Property {
    #[must_use]
    pub fn on_off(value: bool, metadata: PropertyMetadata) -> Self {
        Self {
            metadata,
            kind: PropertyKind::OnOff { value },
        }
    }

    #[must_use]
    pub fn level(value: u8, metadata: PropertyMetadata) -> Self {
        Self {
            metadata,
            kind: PropertyKind::Level {
                value,
                adjust: DimAdjust::new(value),
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> PropertyName {
        match self.kind {
            PropertyKind::OnOff { .. } => PropertyName::On,
            PropertyKind::Level { .. } => PropertyName::Level,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &PropertyMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn value(&self) -> PropertyValue {
        match self.kind {
            PropertyKind::OnOff { value } => PropertyValue::Bool(value),
            PropertyKind::Level { value, .. } => PropertyValue::Percent(value),
        }
    }

    /// The dim/bright bookkeeping, present only on level properties.
    #[must_use]
    pub fn adjust(&self) -> Option<&DimAdjust> {
        match &self.kind {
            PropertyKind::Level { adjust, .. } => Some(adjust),
            PropertyKind::OnOff { .. } => None,
        }
    }

    /// Apply a user/system write.
    ///
    /// Caches the value (percentages clamped to 0–100), recomputes the
    /// relative-step bookkeeping for level properties, and returns the
    /// resolved value. The caller must emit exactly one property-changed
    /// notification per call, whether or not the value changed.
    ///
    /// Returns `None` when the written value's shape does not match the
    /// property (a boolean written to a level property or vice versa).
    pub fn apply_outbound(&mut self, new_value: PropertyValue) -> Option<PropertyValue> {
        match (&mut self.kind, new_value) {
            (PropertyKind::OnOff { value }, PropertyValue::Bool(requested)) => {
                *value = requested;
                Some(PropertyValue::Bool(requested))
            }
            (PropertyKind::Level { value, adjust }, PropertyValue::Percent(requested)) => {
                let resolved = requested.min(100);
                adjust.record(resolved);
                *value = resolved;
                Some(PropertyValue::Percent(resolved))
            }
            _ => None,
        }
    }

    /// Apply a protocol-origin update.
    ///
    /// On/off properties are overwritten; level properties move by a clamped
    /// signed delta. The dim/bright bookkeeping is deliberately left alone,
    /// and this path must never result in an outbound command — the caller
    /// notifies only when `changed` is true and issues nothing.
    pub fn apply_inbound(&mut self, effect: InboundEffect, magnitude: u8) -> InboundOutcome {
        match (&mut self.kind, effect) {
            (PropertyKind::OnOff { value }, InboundEffect::Assign(assigned)) => {
                let changed = *value != assigned;
                *value = assigned;
                InboundOutcome {
                    value: PropertyValue::Bool(assigned),
                    changed,
                }
            }
            (PropertyKind::Level { value, .. }, InboundEffect::Step(sign)) => {
                let delta = i16::from(sign.factor()) * i16::from(magnitude);
                let resolved = clamp_percent(i16::from(*value) + delta);
                let changed = *value != resolved;
                *value = resolved;
                InboundOutcome {
                    value: PropertyValue::Percent(resolved),
                    changed,
                }
            }
            // Shape mismatch: the status rule targets a property of a
            // different kind. Nothing to do.
            (_, _) => InboundOutcome {
                value: self.value(),
                changed: false,
            },
        }
    }
}

/// How an inbound status rule acts on its target property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEffect {
    /// Overwrite a boolean property.
    Assign(bool),
    /// Move a level property by the event magnitude, in the given direction.
    Step(StepSign),
}

/// Sign of an inbound level delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSign {
    Up,
    Down,
}

impl StepSign {
    #[must_use]
    pub fn factor(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}
