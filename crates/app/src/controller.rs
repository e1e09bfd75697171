//! Bridge controller — lifecycle and the single event-driven dispatch loop.
//!
//! All work happens on one loop: transport events (unit status, closure),
//! bridge requests (property writes, pairing re-scans, shutdown), and the
//! periodic clock resync are multiplexed with `select!` and processed to
//! completion one at a time. The device registry is owned by the loop, so
//! no locking is needed anywhere.
//!
//! Shutdown is ordered: the resync timer stops scheduling first, then the
//! transport is asked to stop, and the `unload` caller's acknowledgement is
//! only sent once the transport confirms closure on its event stream.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use x10hub_domain::address::DeviceId;
use x10hub_domain::command::Command;
use x10hub_domain::device::X10Device;
use x10hub_domain::error::X10HubError;
use x10hub_domain::module::ModuleDescriptor;
use x10hub_domain::property::{PropertyName, PropertyValue};
use x10hub_domain::status::StatusEvent;
use x10hub_domain::time;

use crate::dispatcher;
use crate::notifications::{NotificationBus, PropertyChanged};
use crate::ports::transport::{PowerLineTransport, TransportEvent};
use crate::registry::{DeviceRegistry, InsertOutcome};

/// Controller configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Device path handed to the transport, e.g. `/dev/ttyUSB0`.
    pub device_path: String,
    /// How often to resynchronise the interface clock.
    pub clock_resync_interval: Duration,
}

impl BridgeConfig {
    /// Default resync cadence: once a day, to counter clock drift.
    pub const DEFAULT_CLOCK_RESYNC: Duration = Duration::from_secs(24 * 60 * 60);
}

/// Result of constructing devices from the configured module list.
#[derive(Debug, Default)]
pub struct ModuleReport {
    /// Number of devices newly added (already-present ids are skipped).
    pub added: usize,
    /// Modules whose configured type the catalog rejected.
    pub rejected: Vec<x10hub_domain::module::UnknownModuleType>,
}

enum BridgeRequest {
    SetProperty {
        device: DeviceId,
        property: PropertyName,
        value: PropertyValue,
        reply: oneshot::Sender<Result<PropertyValue, X10HubError>>,
    },
    StartPairing {
        reply: oneshot::Sender<usize>,
    },
    GetDevice {
        device: DeviceId,
        reply: oneshot::Sender<Option<X10Device>>,
    },
    ListDevices {
        reply: oneshot::Sender<Vec<X10Device>>,
    },
    Unload {
        reply: oneshot::Sender<Result<(), X10HubError>>,
    },
}

/// The dispatch loop is no longer running.
#[derive(Debug, thiserror::Error)]
#[error("bridge dispatch loop is not running")]
pub struct BridgeStopped;

fn bridge_stopped() -> X10HubError {
    X10HubError::Transport(Box::new(BridgeStopped))
}

/// Cloneable handle for talking to a running bridge.
///
/// Every operation is forwarded as a message to the dispatch loop, so the
/// single-threaded event model holds no matter how many handles exist.
#[derive(Clone)]
pub struct BridgeHandle {
    requests: mpsc::Sender<BridgeRequest>,
    notifications: NotificationBus,
}

impl BridgeHandle {
    /// Subscribe to property-changed notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PropertyChanged> {
        self.notifications.subscribe()
    }

    /// Write a property value; returns the resolved value.
    ///
    /// # Errors
    ///
    /// Propagates [`X10HubError::DeviceNotFound`],
    /// [`X10HubError::UnknownProperty`], [`X10HubError::ValueMismatch`], or
    /// a transport error when the loop has stopped.
    pub async fn set_property(
        &self,
        device: DeviceId,
        property: PropertyName,
        value: PropertyValue,
    ) -> Result<PropertyValue, X10HubError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(BridgeRequest::SetProperty {
                device,
                property,
                value,
                reply,
            })
            .await
            .map_err(|_| bridge_stopped())?;
        rx.await.map_err(|_| bridge_stopped())?
    }

    /// Re-scan the configured modules; returns how many devices were added.
    ///
    /// Idempotent per device id — existing devices are skipped silently.
    ///
    /// # Errors
    ///
    /// Fails only when the loop has stopped.
    pub async fn start_pairing(&self) -> Result<usize, X10HubError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(BridgeRequest::StartPairing { reply })
            .await
            .map_err(|_| bridge_stopped())?;
        rx.await.map_err(|_| bridge_stopped())
    }

    /// Snapshot one device by id.
    ///
    /// # Errors
    ///
    /// Fails only when the loop has stopped.
    pub async fn device(&self, device: DeviceId) -> Result<Option<X10Device>, X10HubError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(BridgeRequest::GetDevice { device, reply })
            .await
            .map_err(|_| bridge_stopped())?;
        rx.await.map_err(|_| bridge_stopped())
    }

    /// Snapshot all registered devices.
    ///
    /// # Errors
    ///
    /// Fails only when the loop has stopped.
    pub async fn devices(&self) -> Result<Vec<X10Device>, X10HubError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(BridgeRequest::ListDevices { reply })
            .await
            .map_err(|_| bridge_stopped())?;
        rx.await.map_err(|_| bridge_stopped())
    }

    /// Shut the bridge down.
    ///
    /// Completes only after the transport has confirmed closure and the
    /// dispatch loop has released its timer.
    ///
    /// # Errors
    ///
    /// Propagates the transport's shutdown failure, or a transport error
    /// when the loop has already stopped.
    pub async fn unload(&self) -> Result<(), X10HubError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(BridgeRequest::Unload { reply })
            .await
            .map_err(|_| bridge_stopped())?;
        rx.await.map_err(|_| bridge_stopped())?
    }
}

/// The bridge controller: builds devices from configuration, owns the
/// transport, and runs the dispatch loop.
pub struct BridgeController<T> {
    core: Core<T>,
    clock_resync_interval: Duration,
    requests: mpsc::Receiver<BridgeRequest>,
    events: mpsc::Receiver<TransportEvent>,
}

impl<T: PowerLineTransport> BridgeController<T> {
    /// Open the transport, build a device for every configured module, and
    /// return the controller together with a [`BridgeHandle`].
    ///
    /// Modules with an unknown type are reported (warn log, and in the
    /// registry they are simply absent); the remaining modules are still
    /// constructed. Call [`run`](Self::run) afterwards to serve events.
    ///
    /// # Errors
    ///
    /// Propagates the transport's open failure.
    pub async fn start(
        transport: T,
        events: mpsc::Receiver<TransportEvent>,
        modules: Vec<ModuleDescriptor>,
        config: BridgeConfig,
    ) -> Result<(Self, BridgeHandle), X10HubError> {
        transport.start(&config.device_path).await?;
        tracing::info!(path = %config.device_path, "power-line transport opened");

        let notifications = NotificationBus::new(64);
        let (requests_tx, requests_rx) = mpsc::channel(32);

        let mut core = Core {
            transport,
            registry: DeviceRegistry::new(),
            notifications: notifications.clone(),
            modules,
        };
        let report = core.add_modules();
        tracing::info!(devices = report.added, "configured modules constructed");

        let controller = Self {
            core,
            clock_resync_interval: config.clock_resync_interval,
            requests: requests_rx,
            events,
        };
        let handle = BridgeHandle {
            requests: requests_tx,
            notifications,
        };
        Ok((controller, handle))
    }

    /// Run the dispatch loop until the transport closes.
    ///
    /// # Errors
    ///
    /// Propagates the transport's shutdown failure when no `unload` caller
    /// is waiting for it.
    pub async fn run(self) -> Result<(), X10HubError> {
        let Self {
            mut core,
            clock_resync_interval,
            mut requests,
            mut events,
        } = self;

        let mut clock = interval_at(
            Instant::now() + clock_resync_interval,
            clock_resync_interval,
        );
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Pending unload acknowledgement; also gates the clock timer
        // (scheduling stops before transport teardown).
        let mut stopping: Option<oneshot::Sender<Result<(), X10HubError>>> = None;
        let mut requests_open = true;

        loop {
            tokio::select! {
                _ = clock.tick(), if stopping.is_none() => {
                    core.resync_clock().await;
                }
                request = requests.recv(), if requests_open => {
                    let Some(request) = request else {
                        // Every handle is gone; keep reflecting line traffic.
                        requests_open = false;
                        continue;
                    };
                    match request {
                        BridgeRequest::SetProperty { device, property, value, reply } => {
                            let result = core.set_property(&device, property, value).await;
                            let _ = reply.send(result);
                        }
                        BridgeRequest::StartPairing { reply } => {
                            let report = core.add_modules();
                            let _ = reply.send(report.added);
                        }
                        BridgeRequest::GetDevice { device, reply } => {
                            let _ = reply.send(core.registry.get(&device).cloned());
                        }
                        BridgeRequest::ListDevices { reply } => {
                            let _ = reply.send(core.registry.iter().cloned().collect());
                        }
                        BridgeRequest::Unload { reply } => {
                            tracing::info!("bridge stopping");
                            stopping = Some(reply);
                            if let Err(err) = core.transport.stop().await {
                                // Closure will never be confirmed; fail the
                                // unload instead of waiting forever.
                                if let Some(ack) = stopping.take() {
                                    let _ = ack.send(Err(err.into()));
                                }
                                return Ok(());
                            }
                        }
                    }
                }
                event = events.recv() => {
                    match event {
                        Some(TransportEvent::UnitStatus(status)) => core.handle_status(&status),
                        Some(TransportEvent::Closed) | None => {
                            tracing::info!("power-line transport closed");
                            if let Some(ack) = stopping.take() {
                                let _ = ack.send(Ok(()));
                            }
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// State owned by the dispatch loop.
struct Core<T> {
    transport: T,
    registry: DeviceRegistry,
    notifications: NotificationBus,
    modules: Vec<ModuleDescriptor>,
}

impl<T: PowerLineTransport> Core<T> {
    /// Build a device for every configured module not yet registered.
    fn add_modules(&mut self) -> ModuleReport {
        let mut report = ModuleReport::default();

        for descriptor in &self.modules {
            let id = descriptor.address().device_id();
            if self.registry.contains(&id) {
                continue;
            }

            match X10Device::from_descriptor(descriptor) {
                Ok(device) => {
                    tracing::info!(
                        device = %id,
                        name = device.name(),
                        "device added"
                    );
                    if self.registry.insert(device) == InsertOutcome::Added {
                        report.added += 1;
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        address = %descriptor.address(),
                        module_type = %err.configured,
                        "skipping module with unknown type"
                    );
                    report.rejected.push(err);
                }
            }
        }
        report
    }

    async fn set_property(
        &mut self,
        device_id: &DeviceId,
        property: PropertyName,
        value: PropertyValue,
    ) -> Result<PropertyValue, X10HubError> {
        let device = self
            .registry
            .get_mut(device_id)
            .ok_or_else(|| X10HubError::DeviceNotFound(device_id.clone()))?;

        let outcome = device.set_property(property, value)?;
        tracing::debug!(
            device = %device_id,
            property = %property,
            value = %outcome.change.value,
            "property written"
        );

        // The host hears about the write first; the commands realising it
        // follow, fire-and-forget.
        self.notifications.publish(PropertyChanged {
            device_id: device_id.clone(),
            property: outcome.change.property,
            value: outcome.change.value,
            timestamp: time::now(),
        });

        for command in &outcome.commands {
            self.issue(*command).await;
        }
        Ok(outcome.change.value)
    }

    async fn issue(&self, command: Command) {
        tracing::debug!(%command, "issuing power-line command");
        let result = match command {
            Command::TurnOn(addr) => self.transport.turn_on(&[addr]).await,
            Command::TurnOff(addr) => self.transport.turn_off(&[addr]).await,
            Command::Dim(addr, amount) => self.transport.dim(&[addr], amount).await,
            Command::Bright(addr, amount) => self.transport.bright(&[addr], amount).await,
        };
        if let Err(err) = result {
            tracing::warn!(error = %err, %command, "power-line command failed");
        }
    }

    fn handle_status(&mut self, status: &StatusEvent) {
        for (device_id, change) in dispatcher::dispatch(&mut self.registry, status) {
            self.notifications.publish(PropertyChanged {
                device_id,
                property: change.property,
                value: change.value,
                timestamp: time::now(),
            });
        }
    }

    async fn resync_clock(&self) {
        tracing::info!("resyncing power-line clock");
        if let Err(err) = self.transport.set_clock().await {
            tracing::warn!(error = %err, "clock resync failed");
        }
    }
}
