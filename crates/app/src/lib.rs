//! # x10hub-app
//!
//! Application layer for the x10hub power-line bridge: port definitions
//! (traits the transports and settings stores implement), the device
//! registry, status fan-out, the property-changed notification bus, and the
//! bridge controller that ties them together in one event-driven dispatch
//! loop.
//!
//! ## Dependency rule
//! Depends only on `x10hub-domain` and async runtime primitives. Concrete
//! transports live in adapter crates; the binary crate does the wiring.

pub mod controller;
pub mod dispatcher;
pub mod notifications;
pub mod ports;
pub mod registry;
