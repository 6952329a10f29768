use std::sync::Arc;

use async_trait::async_trait;

use super::raw::RawDevice;

/// Component A. Enumerates the paths of currently connected
/// authenticators; called repeatedly by the ceremony at
/// `EngineConfig::poll_interval`. Implementations may be *metered*
/// (returning an incomplete set on the first few polls) or *non-metered*
/// (the full set immediately) — the ceremony tolerates either.
///
/// Has no side effects beyond enumeration; it does not open devices.
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn current_locations(&self) -> Vec<String>;
}

/// Opens a device handle for a path the Locator just reported. Kept
/// separate from [`DeviceLocator`] so a host can enumerate over one
/// mechanism (e.g. a `hidapi` scan) and open devices over another.
#[async_trait]
pub trait DeviceOpener: Send + Sync {
    /// Returns `None` when the path no longer resolves to a device (it
    /// was unplugged between enumeration and open); the caller drops it
    /// silently, matching a failed probe.
    async fn open(&self, path: &str) -> Option<Arc<dyn RawDevice>>;
}
