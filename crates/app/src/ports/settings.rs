//! Settings port — where the configured module list comes from.
//!
//! The bridge loads its module descriptors once at startup and again on a
//! pairing re-scan; how they are persisted (TOML file, gateway database, …)
//! is the implementor's concern.

use std::future::Future;

use x10hub_domain::module::ModuleDescriptor;

/// Source of configured module descriptors.
pub trait SettingsStore: Send + Sync {
    /// Load the configured modules.
    fn load_modules(
        &self,
    ) -> impl Future<Output = Result<Vec<ModuleDescriptor>, SettingsError>> + Send;
}

/// Failure to load settings.
#[derive(Debug, thiserror::Error)]
#[error("failed to load module settings")]
pub struct SettingsError(#[source] pub Box<dyn std::error::Error + Send + Sync>);
