use crate::error::EngineError;
use fido_common::credential::public_key::{Descriptor, Parameters, RelyingPartyEntity, UserEntity};
use webauthn3_proto::ConveyancePreference;

/// > discouraged | preferred | required — see `WebAuthn`'s
/// > `UserVerificationRequirement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserVerificationRequirement {
    Discouraged,
    Preferred,
    Required,
}

impl UserVerificationRequirement {
    pub fn is_required(self) -> bool {
        matches!(self, Self::Required)
    }
}

/// Input to [`crate::register`]: the relying party's requirements for
/// minting a new credential.
#[derive(Debug, Clone)]
pub struct RegisterChallenge {
    pub challenge: Vec<u8>,
    pub relying_party: RelyingPartyEntity,
    pub user: UserEntity,
    pub credential_parameters: Vec<Parameters>,
    pub excluded_credentials: Vec<Descriptor>,
    pub attestation: ConveyancePreference,
    pub resident_key: bool,
    pub user_verification: UserVerificationRequirement,
}

impl RegisterChallenge {
    /// INIT-state validation (§4.D.1): rejects a malformed challenge
    /// before DISCOVERING ever polls the Locator. `origin` is threaded in
    /// here rather than checked separately, since it is part of the same
    /// "reject immediately on missing origin / challenge / ..." rule.
    pub(crate) fn validate(&self, origin: &str) -> Result<(), EngineError> {
        if origin.is_empty() {
            return Err(EngineError::InvalidArgument(
                "origin must not be empty".into(),
            ));
        }
        if self.challenge.is_empty() {
            return Err(EngineError::InvalidArgument(
                "challenge must not be empty".into(),
            ));
        }
        if self.relying_party.id.is_empty() {
            return Err(EngineError::InvalidArgument(
                "relying party id must not be empty".into(),
            ));
        }
        if self.relying_party.name.is_empty() {
            return Err(EngineError::InvalidArgument(
                "relying party name must not be empty".into(),
            ));
        }
        if self.user.id.is_empty() {
            return Err(EngineError::InvalidArgument(
                "user id must not be empty".into(),
            ));
        }
        if self.user.name.is_empty() {
            return Err(EngineError::InvalidArgument(
                "user name must not be empty".into(),
            ));
        }
        if self.resident_key && self.user.display_name.is_empty() {
            return Err(EngineError::InvalidArgument(
                "user display name is required for a resident-key registration".into(),
            ));
        }
        if !self.credential_parameters.iter().any(Parameters::is_es256) {
            return Err(EngineError::InvalidArgument(
                "credential parameters must include ES256".into(),
            ));
        }
        Ok(())
    }
}

/// Input to [`crate::login`]: the relying party's requirements for
/// asserting an existing credential.
#[derive(Debug, Clone)]
pub struct LoginChallenge {
    pub challenge: Vec<u8>,
    pub relying_party_id: String,
    /// Legacy U2F `appid` extension, consulted only when the sole
    /// plugged device turns out to be U2F-only (§4.D.4).
    pub application_id: Option<String>,
    /// Empty means *passwordless*: the engine discovers resident
    /// credentials rather than matching against a supplied list.
    pub allowed_credentials: Vec<Descriptor>,
    pub user_verification: UserVerificationRequirement,
}

impl LoginChallenge {
    /// INIT-state validation (§4.D.1), mirroring
    /// [`RegisterChallenge::validate`].
    pub(crate) fn validate(&self, origin: &str) -> Result<(), EngineError> {
        if origin.is_empty() {
            return Err(EngineError::InvalidArgument(
                "origin must not be empty".into(),
            ));
        }
        if self.challenge.is_empty() {
            return Err(EngineError::InvalidArgument(
                "challenge must not be empty".into(),
            ));
        }
        if self.relying_party_id.is_empty() {
            return Err(EngineError::InvalidArgument(
                "relying party id must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn is_passwordless(&self) -> bool {
        self.allowed_credentials.is_empty()
    }
}
