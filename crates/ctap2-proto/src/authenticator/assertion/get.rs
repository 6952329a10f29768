use crate::authenticator::Sha256Hash;
use fido_common::{credential::public_key, extension};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use serde_indexed::{DeserializeIndexed, SerializeIndexed};

/// Errors `authenticatorGetAssertion` can return (trimmed to the subset
/// observable without the transport's own PIN/UV-token plumbing — see the
/// module docs on [`crate`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    OperationDenied,
    PinInvalid,
    PinBlocked,
    InvalidParameter,
    MissingParameter,
    UnsupportedOption,
    UserActionTimeout,
    NoCredentials,
    /// CTAP2 error 0x3C — user verification failed outright; fatal, not retried.
    UserVerificationInvalid,
    /// CTAP2 error 0x3F — spurious UV failure some devices report; the
    /// caller should retry a bounded number of times (see
    /// `fido2_engine::ceremony`'s UV retry loop).
    UserVerificationBlocked,
    /// CTAP2 error 0x2D (`CTAP2_ERR_KEEPALIVE_CANCEL`) — the device's
    /// `cancel()` side channel unblocked this call.
    Cancelled,
}

/// > The following option keys are defined for use in
/// > `authenticatorGetAssertion`'s `options` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptionKey {
    /// > user presence: Instructs the authenticator to require user consent
    /// > to complete the operation.
    #[cfg_attr(feature = "serde", serde(rename = "up"))]
    UserPresence,
    /// > user verification: If true, instructs the authenticator to require
    /// > a user-verifying gesture in order to complete the request.
    /// > Examples of such gestures are fingerprint scan or a PIN.
    #[cfg_attr(feature = "serde", serde(rename = "uv"))]
    UserVerification,
}

/// Request parameters for [`crate::Ctap2Device::get_assertion`].
///
/// Owned rather than borrowed: see the equivalent note on
/// [`crate::authenticator::credential::make::Request`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(SerializeIndexed))]
pub struct Request {
    /// > relying party identifier
    #[cfg_attr(feature = "serde", serde(index = 0x01))]
    pub relying_party_id: String,
    /// > Hash of the serialized client data collected by the host.
    #[cfg_attr(feature = "serde", serde(index = 0x02))]
    pub client_data_hash: Sha256Hash,
    /// > An array of [`public_key::Descriptor`] structures, each denoting a
    /// > credential, as specified in `WebAuthn`. If this parameter is
    /// > present the authenticator MUST only generate an assertion using
    /// > one of the denoted credentials. Empty when a resident-credential
    /// > discovery flow is requested.
    #[cfg_attr(feature = "serde", serde(index = 0x03))]
    pub allow_list: Vec<public_key::Descriptor>,
    #[cfg_attr(feature = "serde", serde(index = 0x04))]
    pub extensions: BTreeMap<extension::Identifier, Vec<u8>>,
    #[cfg_attr(feature = "serde", serde(index = 0x05))]
    pub options: BTreeMap<OptionKey, bool>,
    /// Plaintext PIN collected via the Prompt Mediator; see the equivalent
    /// note on [`crate::authenticator::credential::make::Request`].
    pub pin: Option<String>,
}

/// Response structure for [`crate::Ctap2Device::get_assertion`].
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(DeserializeIndexed))]
pub struct Response {
    /// > PublicKeyCredentialDescriptor structure containing the credential
    /// > identifier whose private key was used to generate the assertion.
    #[cfg_attr(feature = "serde", serde(index = 0x01))]
    pub credential: Option<public_key::Descriptor>,
    /// > The signed-over contextual bindings made by the authenticator, as
    /// > specified in [WebAuthn].
    #[cfg_attr(feature = "serde", serde(index = 0x02))]
    pub auth_data: Vec<u8>,
    /// > The assertion signature produced by the authenticator, as
    /// > specified in [WebAuthn].
    #[cfg_attr(feature = "serde", serde(index = 0x03))]
    pub signature: Vec<u8>,
    /// > [`public_key::UserEntity`] structure containing the user account
    /// > information
    #[cfg_attr(feature = "serde", serde(index = 0x04))]
    pub user: Option<public_key::UserEntity>,
    /// > Total number of account credentials for the RP. Required when
    /// > more than one credential is found for an RP and the authenticator
    /// > cannot present a selection UI of its own.
    #[cfg_attr(feature = "serde", serde(index = 0x05))]
    pub number_of_credentials: Option<usize>,
}
