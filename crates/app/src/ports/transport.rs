//! Transport port — lifecycle and command surface of a power-line interface.
//!
//! A transport bridges the physical half-duplex power-line medium (serial
//! CM11A-style controller, simulated line, …) into the bridge. Commands are
//! fire-and-forget from the core's perspective: a successful return means
//! the transport accepted the command, not that the module acted on it.
//!
//! Incoming traffic is not callback-based. The transport produces a stream
//! of tagged [`TransportEvent`]s over a channel, consumed by the bridge
//! controller's single dispatch loop.

use std::future::Future;

use x10hub_domain::address::X10Address;
use x10hub_domain::error::X10HubError;
use x10hub_domain::status::StatusEvent;

/// Tagged event produced by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A unit-status report from the line (may address several units).
    UnitStatus(StatusEvent),
    /// The transport has shut down. Emitted exactly once, after
    /// [`PowerLineTransport::stop`] completes its work.
    Closed,
}

/// A pluggable power-line transport.
///
/// Implementations live in adapter crates (e.g. the virtual transport).
/// All addresses are passed as slices because the protocol lets one command
/// target several units; dim/bright amounts are relative steps in `0..=22`.
pub trait PowerLineTransport: Send + Sync {
    /// Open the transport on the given device path.
    fn start(&self, device_path: &str)
    -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Request shutdown. The transport must emit [`TransportEvent::Closed`]
    /// on its event stream once the line is released.
    fn stop(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Resynchronise the interface clock (drift correction).
    fn set_clock(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Power the addressed units on.
    fn turn_on(
        &self,
        units: &[X10Address],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Power the addressed units off.
    fn turn_off(
        &self,
        units: &[X10Address],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Lower the addressed units' level by `amount` steps.
    fn dim(
        &self,
        units: &[X10Address],
        amount: u8,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Raise the addressed units' level by `amount` steps.
    fn bright(
        &self,
        units: &[X10Address],
        amount: u8,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Errors reported by a transport implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The device path could not be opened.
    #[error("failed to open transport at {path}")]
    Open {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A command or clock write failed.
    #[error("transport write failed")]
    Write(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The transport is not running.
    #[error("transport is not running")]
    NotRunning,
}

impl From<TransportError> for X10HubError {
    fn from(err: TransportError) -> Self {
        Self::Transport(Box::new(err))
    }
}
