//! # x10hub-transport-virtual
//!
//! Virtual power-line transport that simulates a CM11A-style interface for
//! testing and demonstration: issued commands are recorded instead of
//! written to a serial line, and tests can inject unit-status events as if
//! they arrived from the power line.
//!
//! ## Dependency rule
//!
//! Depends on `x10hub-app` (port traits) and `x10hub-domain` only.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use x10hub_app::ports::transport::{PowerLineTransport, TransportError, TransportEvent};
use x10hub_domain::address::X10Address;
use x10hub_domain::status::StatusEvent;

/// One recorded interaction with the simulated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuedCommand {
    TurnOn(Vec<X10Address>),
    TurnOff(Vec<X10Address>),
    Dim(Vec<X10Address>, u8),
    Bright(Vec<X10Address>, u8),
    SetClock,
}

#[derive(Debug, Default)]
struct Inner {
    running: bool,
    device_path: Option<String>,
    issued: Vec<IssuedCommand>,
}

/// Simulated power-line transport.
///
/// Cloneable; all clones share the same simulated line state.
#[derive(Debug, Clone)]
pub struct VirtualPowerLine {
    inner: Arc<Mutex<Inner>>,
    events: mpsc::Sender<TransportEvent>,
}

impl VirtualPowerLine {
    /// Create a transport together with the event stream the bridge
    /// controller consumes.
    #[must_use]
    pub fn new() -> (Self, mpsc::Receiver<TransportEvent>) {
        let (events, events_rx) = mpsc::channel(32);
        (
            Self {
                inner: Arc::new(Mutex::new(Inner::default())),
                events,
            },
            events_rx,
        )
    }

    /// Inject a unit-status event, as if it was reported from the line.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotRunning`] when the transport is stopped
    /// or nobody consumes the event stream.
    pub async fn inject_status(&self, status: StatusEvent) -> Result<(), TransportError> {
        if !self.is_running() {
            return Err(TransportError::NotRunning);
        }
        self.events
            .send(TransportEvent::UnitStatus(status))
            .await
            .map_err(|err| TransportError::Write(Box::new(err)))
    }

    /// All commands issued so far, in order.
    #[must_use]
    pub fn issued(&self) -> Vec<IssuedCommand> {
        self.inner.lock().map(|inner| inner.issued.clone()).unwrap_or_default()
    }

    /// Drop the recorded command log.
    pub fn clear_issued(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.issued.clear();
        }
    }

    /// Whether `start` has been called without a subsequent `stop`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.lock().map(|inner| inner.running).unwrap_or(false)
    }

    /// The device path the transport was opened on, if any.
    #[must_use]
    pub fn device_path(&self) -> Option<String> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.device_path.clone())
    }

    fn record(&self, command: IssuedCommand) -> Result<(), TransportError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| TransportError::NotRunning)?;
        if !inner.running {
            return Err(TransportError::NotRunning);
        }
        inner.issued.push(command);
        Ok(())
    }
}

impl PowerLineTransport for VirtualPowerLine {
    async fn start(&self, device_path: &str) -> Result<(), TransportError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| TransportError::NotRunning)?;
        inner.running = true;
        inner.device_path = Some(device_path.to_string());
        tracing::info!(path = device_path, "virtual power line opened");
        Ok(())
    }

    async fn stop(&self) -> Result<(), TransportError> {
        {
            let mut inner = self
                .inner
                .lock()
                .map_err(|_| TransportError::NotRunning)?;
            if !inner.running {
                return Err(TransportError::NotRunning);
            }
            inner.running = false;
        }
        tracing::info!("virtual power line closed");
        self.events
            .send(TransportEvent::Closed)
            .await
            .map_err(|err| TransportError::Write(Box::new(err)))
    }

    async fn set_clock(&self) -> Result<(), TransportError> {
        self.record(IssuedCommand::SetClock)
    }

    async fn turn_on(&self, units: &[X10Address]) -> Result<(), TransportError> {
        self.record(IssuedCommand::TurnOn(units.to_vec()))
    }

    async fn turn_off(&self, units: &[X10Address]) -> Result<(), TransportError> {
        self.record(IssuedCommand::TurnOff(units.to_vec()))
    }

    async fn dim(&self, units: &[X10Address], amount: u8) -> Result<(), TransportError> {
        self.record(IssuedCommand::Dim(units.to_vec(), amount))
    }

    async fn bright(&self, units: &[X10Address], amount: u8) -> Result<(), TransportError> {
        self.record(IssuedCommand::Bright(units.to_vec(), amount))
    }
}
