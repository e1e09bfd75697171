//! Port definitions — traits implemented by adapters and the binary crate.

pub mod settings;
pub mod transport;

pub use settings::{SettingsError, SettingsStore};
pub use transport::{PowerLineTransport, TransportError, TransportEvent};
