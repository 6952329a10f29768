#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// > An authenticator supporting the enterprise attestation feature is
/// > enterprise attestation capable and signals its support via the `ep`
/// > option ID in the `authenticatorGetInfo` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Kind {
    Platform = 1,
    Vendor = 2,
}
