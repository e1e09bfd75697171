//! X10 addressing — house codes, unit codes, and deterministic device ids.
//!
//! A power-line module is addressed by a house code (`A`–`P`) and a unit
//! code (`1`–`16`), written together as e.g. `A2`. Device ids are derived
//! deterministically from the address so they stay stable across restarts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// House code, one of the letters `A` through `P`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct HouseCode(char);

impl HouseCode {
    /// Validate a letter as a house code. Lowercase input is accepted and
    /// normalised to uppercase.
    ///
    /// # Errors
    ///
    /// Returns [`AddressParseError::HouseCode`] for anything outside `A`–`P`.
    pub fn new(letter: char) -> Result<Self, AddressParseError> {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() && upper <= 'P' {
            Ok(Self(upper))
        } else {
            Err(AddressParseError::HouseCode(letter))
        }
    }

    /// The house code letter.
    #[must_use]
    pub fn letter(self) -> char {
        self.0
    }
}

impl TryFrom<char> for HouseCode {
    type Error = AddressParseError;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Self::new(letter)
    }
}

impl From<HouseCode> for char {
    fn from(code: HouseCode) -> Self {
        code.0
    }
}

impl fmt::Display for HouseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unit code, `1` through `16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct UnitCode(u8);

impl UnitCode {
    /// Validate a number as a unit code.
    ///
    /// # Errors
    ///
    /// Returns [`AddressParseError::UnitCode`] for anything outside `1`–`16`.
    pub fn new(number: u8) -> Result<Self, AddressParseError> {
        if (1..=16).contains(&number) {
            Ok(Self(number))
        } else {
            Err(AddressParseError::UnitCode(number))
        }
    }

    /// The unit number.
    #[must_use]
    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for UnitCode {
    type Error = AddressParseError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number)
    }
}

impl From<UnitCode> for u8 {
    fn from(code: UnitCode) -> Self {
        code.0
    }
}

impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Full X10 address of one power-line module, e.g. `A2` or `P16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct X10Address {
    pub house: HouseCode,
    pub unit: UnitCode,
}

impl X10Address {
    #[must_use]
    pub fn new(house: HouseCode, unit: UnitCode) -> Self {
        Self { house, unit }
    }

    /// Derive the globally unique device id for this address.
    #[must_use]
    pub fn device_id(self) -> DeviceId {
        DeviceId(format!("x10-{self}"))
    }
}

impl fmt::Display for X10Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.house, self.unit)
    }
}

impl FromStr for X10Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let letter = chars.next().ok_or(AddressParseError::Empty)?;
        let house = HouseCode::new(letter)?;
        let rest = chars.as_str();
        let number: u8 = rest.parse().map_err(|_| AddressParseError::Malformed)?;
        let unit = UnitCode::new(number)?;
        Ok(Self { house, unit })
    }
}

impl TryFrom<String> for X10Address {
    type Error = AddressParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<X10Address> for String {
    fn from(addr: X10Address) -> Self {
        addr.to_string()
    }
}

/// Globally unique device identifier, derived deterministically from the
/// protocol address (`x10-A2`). Stable across restarts and re-scans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Access the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Failure to interpret a house/unit code or an address string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// The letter is outside `A`–`P`.
    #[error("invalid house code: {0:?}")]
    HouseCode(char),
    /// The number is outside `1`–`16`.
    #[error("invalid unit code: {0}")]
    UnitCode(u8),
    /// The unit part was not a number at all.
    #[error("malformed address")]
    Malformed,
    /// The address string was empty.
    #[error("empty address")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> X10Address {
        s.parse().unwrap()
    }

    #[test]
    fn should_accept_house_codes_a_through_p() {
        assert!(HouseCode::new('A').is_ok());
        assert!(HouseCode::new('P').is_ok());
        assert!(HouseCode::new('Q').is_err());
        assert!(HouseCode::new('1').is_err());
    }

    #[test]
    fn should_normalise_lowercase_house_code() {
        let code = HouseCode::new('c').unwrap();
        assert_eq!(code.letter(), 'C');
    }

    #[test]
    fn should_accept_unit_codes_1_through_16() {
        assert!(UnitCode::new(1).is_ok());
        assert!(UnitCode::new(16).is_ok());
        assert!(UnitCode::new(0).is_err());
        assert!(UnitCode::new(17).is_err());
    }

    #[test]
    fn should_roundtrip_address_through_display_and_from_str() {
        let a = addr("A2");
        assert_eq!(a.to_string(), "A2");
        let b = addr("P16");
        assert_eq!(b.to_string(), "P16");
    }

    #[test]
    fn should_reject_malformed_address_strings() {
        assert!("".parse::<X10Address>().is_err());
        assert!("2A".parse::<X10Address>().is_err());
        assert!("A".parse::<X10Address>().is_err());
        assert!("A99".parse::<X10Address>().is_err());
    }

    #[test]
    fn should_derive_deterministic_device_id() {
        assert_eq!(addr("A2").device_id().as_str(), "x10-A2");
        assert_eq!(addr("B5").device_id(), addr("B5").device_id());
    }

    #[test]
    fn should_roundtrip_address_through_serde_json() {
        let a = addr("C7");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"C7\"");
        let parsed: X10Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, a);
    }
}
