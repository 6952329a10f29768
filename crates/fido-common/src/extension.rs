#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// > Extension identifiers are strings, as registered in the IANA
/// > "WebAuthn Extension Identifier" registry. Only the two extensions the
/// > orchestration engine itself interprets are enumerated here — `appid`
/// > drives the legacy U2F fallback (see `fido2_engine::ceremony::login`)
/// > and `credProtect` informs resident-credential disclosure. Authenticator
/// > extensions the engine does not interpret pass through as opaque bytes
/// > and are not represented here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum Identifier {
    #[cfg_attr(feature = "serde", serde(rename = "appid"))]
    AppId,
    #[cfg_attr(feature = "serde", serde(rename = "hmac-secret"))]
    HmacSecret,
    #[cfg_attr(feature = "serde", serde(rename = "credProtect"))]
    CredProtect,
}
