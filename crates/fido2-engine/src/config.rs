use std::time::Duration;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
const DEFAULT_UV_RETRY_LIMIT: u8 = 3;

/// Process-wide tunables the source system reaches for as globals; here
/// they are an explicit value threaded through at engine construction
/// instead (see the design notes on global configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How often the Device Locator is polled while discovering devices.
    pub poll_interval: Duration,
    /// How many times a worker retries a spurious UV failure (CTAP2 error
    /// 0x3F) on the same device before giving up.
    pub uv_retry_limit: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            uv_retry_limit: DEFAULT_UV_RETRY_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Builds the configuration from the environment, falling back to
    /// defaults for anything absent or unparseable. A malformed
    /// `FIDO2POLLINTERVAL` is logged and ignored rather than treated as a
    /// construction error — a bad tuning knob must never turn into an
    /// outage.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("FIDO2POLLINTERVAL") {
            match raw.parse::<u64>() {
                Ok(millis) => config.poll_interval = Duration::from_millis(millis),
                Err(_) => {
                    tracing::warn!(
                        value = %raw,
                        "invalid FIDO2POLLINTERVAL, falling back to default poll interval"
                    );
                }
            }
        }

        config
    }
}

/// `IsFIDO2Available()` from the external interface: consults the `FIDO2`
/// environment variable. Unset or any value other than `"0"` is treated
/// as enabled.
pub fn fido2_enabled() -> bool {
    std::env::var("FIDO2").map(|v| v != "0").unwrap_or(true)
}
