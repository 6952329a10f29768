use async_trait::async_trait;
use ctap2_proto::authenticator::{assertion, credential, device::Info};

/// Result of probing a newly discovered path during DISCOVERING.
#[derive(Debug, Clone)]
pub enum Probe {
    /// A genuine CTAP2 authenticator, with its capability record.
    Fido2(Info),
    /// A legacy U2F-only device, retained for the `appid` fallback.
    NotFido2,
}

/// The abstract authenticator boundary a Device Adapter drives. A real
/// host implements this over its libfido2 bindings; the engine only ever
/// sees this trait, never a transport.
///
/// Blocking device I/O is modelled as an async call: a real implementation
/// is expected to run its blocking libfido2 call on a blocking thread
/// (e.g. `tokio::task::spawn_blocking`) and resolve the future when that
/// call returns, so that `cancel()` can unblock it out of band exactly as
/// §5 describes.
#[async_trait]
pub trait RawDevice: Send + Sync {
    /// Opaque path, unique among currently plugged devices.
    fn path(&self) -> &str;

    /// Probes the device's capabilities. Returns `Err` only for a failed
    /// probe, which the Locator's caller discards silently.
    async fn probe(&self) -> Result<Probe, ()>;

    async fn make_credential(
        &self,
        request: credential::make::Request,
    ) -> Result<credential::make::Response, credential::make::Error>;

    /// Returns every assertion the device produced for `request`: more
    /// than one when it holds several resident credentials matching an
    /// empty `allow_list`, otherwise exactly one. A real transport folds
    /// `authenticatorGetNextAssertion` into this single call.
    async fn get_assertion(
        &self,
        request: assertion::get::Request,
    ) -> Result<Vec<assertion::get::Response>, assertion::get::Error>;

    /// Interrupts an in-flight blocking call on this device, causing it to
    /// return a cancellation error from whichever of the above methods is
    /// currently pending.
    fn cancel(&self);
}
