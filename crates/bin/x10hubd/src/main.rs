//! # x10hubd — x10hub daemon
//!
//! Composition root that wires the bridge controller to a transport and
//! runs until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize tracing
//! - Construct the transport adapter and the bridge controller
//! - Spawn the dispatch loop and wait for SIGINT
//! - Drive ordered shutdown (`unload` waits for transport closure)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no reconciliation logic belongs here.

mod config;

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use x10hub_app::controller::BridgeController;
use x10hub_app::ports::settings::SettingsStore;
use x10hub_transport_virtual::VirtualPowerLine;

use config::Config;

/// How long shutdown may wait for the transport to confirm closure.
const UNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let modules = config.load_modules().await?;
    tracing::info!(modules = modules.len(), "configuration loaded");

    // The virtual transport stands in for a serial CM11A interface; a real
    // serial adapter plugs in behind the same port.
    let (transport, events) = VirtualPowerLine::new();

    let (controller, bridge) =
        BridgeController::start(transport, events, modules, config.bridge_config()).await?;

    for device in bridge.devices().await.iter().flatten() {
        tracing::info!(id = %device.id(), name = device.name(), "serving device");
    }

    let dispatch = tokio::spawn(controller.run());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");

    tokio::time::timeout(UNLOAD_TIMEOUT, bridge.unload()).await??;
    dispatch.await??;

    tracing::info!("x10hubd stopped");
    Ok(())
}
