use crate::authenticator::{self, Sha256Hash};
use fido_common::{attestation, credential::public_key, extension};
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use serde_indexed::{DeserializeIndexed, SerializeIndexed};

/// Errors `authenticatorMakeCredential` can return, per the CTAP2
/// specification (trimmed to the subset a Device Adapter without its own
/// key-agreement/PIN-token plumbing can actually produce or observe — see
/// the module docs on [`crate`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    OperationDenied,
    PinInvalid,
    PinBlocked,
    InvalidParameter,
    MissingParameter,
    UnsupportedAlgorithm,
    UnsupportedOption,
    UserActionTimeout,
    CredentialExcluded,
    KeyStoreFull,
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
/// > `authenticatorMakeCredential`'s `options` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OptionKey {
    /// > Specifies whether this credential is to be discoverable or
    /// > not.
    #[cfg_attr(feature = "serde", serde(rename = "rk"))]
    Discoverable,
    /// > user presence: Instructs the authenticator to require user
    /// > consent to complete the operation.
    #[cfg_attr(feature = "serde", serde(rename = "up"))]
    UserPresence,
    /// > user verification: If true, instructs the authenticator to require a
    /// > user-verifying gesture in order to complete the request. Examples of
    /// > such gestures are fingerprint scan or a PIN.
    #[cfg_attr(feature = "serde", serde(rename = "uv"))]
    UserVerification,
}

/// Input parameters for [`crate::Ctap2Device::make_credential`].
///
/// Owned rather than borrowed, unlike the CTAP2 wire structure this
/// mirrors: the Device Adapter hands a `Request` across a spawned worker
/// task (see `fido2_engine::ceremony::worker`), which requires `'static`
/// data.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(SerializeIndexed))]
pub struct Request {
    /// > Hash of the ClientData contextual binding specified by host.
    #[cfg_attr(feature = "serde", serde(index = 0x01))]
    pub client_data_hash: Sha256Hash,
    /// > This PublicKeyCredentialRpEntity data structure describes a
    /// > Relying Party with which the new public key credential will be
    /// > associated.
    #[cfg_attr(feature = "serde", serde(index = 0x02))]
    pub relying_party: public_key::RelyingPartyEntity,
    /// > ... describes the user account to which the new public key
    /// > credential will be associated at the RP.
    #[cfg_attr(feature = "serde", serde(index = 0x03))]
    pub user: public_key::UserEntity,
    /// > List of supported algorithms for credential generation, as
    /// > specified in WebAuthn. The array is ordered from most preferred
    /// > to least preferred and MUST NOT include duplicate entries.
    #[cfg_attr(feature = "serde", serde(index = 0x04))]
    pub public_key_credential_params: Vec<public_key::Parameters>,
    /// > An array of PublicKeyCredentialDescriptor structures. The
    /// > authenticator returns an error if it already contains one of the
    /// > credentials enumerated in this array. This allows RPs to limit
    /// > the creation of multiple credentials for the same account on a
    /// > single authenticator.
    #[cfg_attr(feature = "serde", serde(index = 0x05))]
    pub exclude_list: Vec<public_key::Descriptor>,
    #[cfg_attr(feature = "serde", serde(index = 0x06))]
    pub extensions: BTreeMap<extension::Identifier, Vec<u8>>,
    #[cfg_attr(feature = "serde", serde(index = 0x07))]
    pub options: BTreeMap<OptionKey, bool>,
    /// Plaintext PIN collected via the Prompt Mediator. A real CTAP2
    /// device requires this be exchanged for a `pinUvAuthParam` by the
    /// key-agreement protocol the transport layer performs underneath
    /// this type; the engine only ever deals in the plaintext value the
    /// user typed.
    pub pin: Option<String>,
}

#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(DeserializeIndexed))]
pub struct Response {
    #[cfg_attr(feature = "serde", serde(index = 0x01))]
    pub format: attestation::FormatIdentifier,
    #[cfg_attr(feature = "serde", serde(index = 0x02))]
    pub authenticator_data: authenticator::Data,
    #[cfg_attr(feature = "serde", serde(index = 0x03))]
    pub attestation_statement: attestation::Statement,
}
