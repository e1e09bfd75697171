//! # x10hub-domain
//!
//! Pure domain model for the x10hub power-line bridge.
//!
//! ## Responsibilities
//! - Addressing: house/unit codes, X10 addresses, deterministic device ids
//! - The **module catalog**: which properties each module kind exposes
//! - **Property reconciliation**: outbound writes become relative dim/bright
//!   step bookkeeping, inbound status updates become clamped value changes
//! - The **device aggregate**: translating one property change into protocol
//!   commands and one status event into property mutations
//! - Status rules: how protocol function codes map onto properties
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod address;
pub mod catalog;
pub mod command;
pub mod device;
pub mod error;
pub mod module;
pub mod property;
pub mod status;
pub mod time;
