//! Protocol commands — the value objects handed to the transport port.

use std::fmt;

use crate::address::X10Address;
use crate::property::MAX_DIM_STEPS;

/// One outbound power-line command.
///
/// Dim/bright amounts are relative steps, already capped at
/// [`MAX_DIM_STEPS`] by the reconciliation arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TurnOn(X10Address),
    TurnOff(X10Address),
    Dim(X10Address, u8),
    Bright(X10Address, u8),
}

impl Command {
    /// The address the command targets.
    #[must_use]
    pub fn address(&self) -> X10Address {
        match self {
            Self::TurnOn(addr) | Self::TurnOff(addr) | Self::Dim(addr, _) | Self::Bright(addr, _) => {
                *addr
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TurnOn(addr) => write!(f, "turn_on {addr}"),
            Self::TurnOff(addr) => write!(f, "turn_off {addr}"),
            Self::Dim(addr, amount) => write!(f, "dim {addr} by {amount}"),
            Self::Bright(addr, amount) => write!(f, "bright {addr} by {amount}"),
        }
    }
}
