use std::collections::BTreeMap;
use std::sync::Arc;

use ctap2_proto::authenticator::{
    assertion::get::{self, OptionKey as GetOptionKey},
    credential::make::{self, OptionKey as MakeOptionKey},
    device::Info,
    Sha256Hash,
};
use fido_common::credential::public_key::{Descriptor, Parameters, RelyingPartyEntity, UserEntity};

use crate::error::EngineError;

use super::raw::{Probe, RawDevice};

/// Outcome of probing a device during DISCOVERING.
pub enum ProbeOutcome {
    Fido2(Info),
    NotFido2,
    Failed,
}

/// Component B. Wraps one physical authenticator, translating between
/// the engine's validated, capability-aware calls and the raw CTAP2
/// request/response shapes in `ctap2-proto`.
pub struct DeviceAdapter {
    raw: Arc<dyn RawDevice>,
    uv_retry_limit: u8,
}

/// Parameters for [`DeviceAdapter::make_credential`], already filtered
/// down to the single algorithm (ES256) and option set a worker decided
/// on.
pub struct MakeCredentialCall {
    pub client_data_hash: Sha256Hash,
    pub relying_party: RelyingPartyEntity,
    pub user: UserEntity,
    pub exclude_list: Vec<Descriptor>,
    pub pin: Option<String>,
    pub resident_key: bool,
    pub require_uv: bool,
}

/// Parameters for [`DeviceAdapter::get_assertion`].
pub struct GetAssertionCall {
    pub relying_party_id: String,
    pub client_data_hash: Sha256Hash,
    pub allow_list: Vec<Descriptor>,
    pub pin: Option<String>,
    pub require_uv: bool,
}

impl DeviceAdapter {
    pub fn new(raw: Arc<dyn RawDevice>, uv_retry_limit: u8) -> Self {
        Self { raw, uv_retry_limit }
    }

    pub fn path(&self) -> &str {
        self.raw.path()
    }

    pub fn cancel(&self) {
        self.raw.cancel();
    }

    pub async fn probe(&self) -> ProbeOutcome {
        match self.raw.probe().await {
            Ok(Probe::Fido2(info)) => ProbeOutcome::Fido2(info),
            Ok(Probe::NotFido2) => ProbeOutcome::NotFido2,
            Err(()) => ProbeOutcome::Failed,
        }
    }

    /// Validates `call` against `info`'s capabilities (§4.B's UV/RK
    /// rules), dispatches to the raw device, and retries a spurious UV
    /// failure (error 0x3F) up to `uv_retry_limit` times before giving
    /// up.
    pub async fn make_credential(
        &self,
        info: &Info,
        call: MakeCredentialCall,
    ) -> Result<make::Response, EngineError> {
        if call.require_uv {
            validate_uv_capable(info, call.pin.as_deref())?;
        }
        if call.resident_key && !info.supports_resident_key() {
            return Err(EngineError::Unsupported(
                "device does not support resident keys".into(),
            ));
        }

        let mut options = BTreeMap::new();
        if call.resident_key {
            options.insert(MakeOptionKey::Discoverable, true);
        }
        if call.require_uv {
            options.insert(MakeOptionKey::UserVerification, true);
        }

        let request = make::Request {
            client_data_hash: call.client_data_hash,
            relying_party: call.relying_party,
            user: call.user,
            public_key_credential_params: vec![Parameters::es256()],
            exclude_list: call.exclude_list,
            extensions: BTreeMap::new(),
            options,
            pin: call.pin,
        };

        let mut attempts_left = self.uv_retry_limit;
        loop {
            match self.raw.make_credential(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(make::Error::UserVerificationBlocked) if attempts_left > 0 => {
                    attempts_left -= 1;
                    tracing::warn!(path = self.path(), "retrying after transient UV failure");
                }
                Err(make::Error::UserVerificationBlocked) => {
                    return Err(EngineError::Internal("libfido2 error 63".into()));
                }
                Err(other) => return Err(map_make_error(other)),
            }
        }
    }

    /// Validates `call` against `info`'s capabilities, dispatches to the
    /// raw device, and retries a spurious UV failure as
    /// [`Self::make_credential`] does.
    pub async fn get_assertion(
        &self,
        info: &Info,
        call: GetAssertionCall,
    ) -> Result<Vec<get::Response>, EngineError> {
        if call.require_uv {
            validate_uv_capable(info, call.pin.as_deref())?;
        }

        let mut options = BTreeMap::new();
        if call.require_uv {
            options.insert(GetOptionKey::UserVerification, true);
        }

        let request = get::Request {
            relying_party_id: call.relying_party_id,
            client_data_hash: call.client_data_hash,
            allow_list: call.allow_list,
            extensions: BTreeMap::new(),
            options,
            pin: call.pin,
        };

        let mut attempts_left = self.uv_retry_limit;
        loop {
            match self.raw.get_assertion(request.clone()).await {
                Ok(responses) if responses.is_empty() => {
                    return Err(EngineError::NoCredentials)
                }
                Ok(responses) => return Ok(responses),
                Err(get::Error::UserVerificationBlocked) if attempts_left > 0 => {
                    attempts_left -= 1;
                    tracing::warn!(path = self.path(), "retrying after transient UV failure");
                }
                Err(get::Error::UserVerificationBlocked) => {
                    return Err(EngineError::Internal("libfido2 error 63".into()));
                }
                Err(other) => return Err(map_get_error(other)),
            }
        }
    }
}

fn validate_uv_capable(info: &Info, pin: Option<&str>) -> Result<(), EngineError> {
    if info.is_biometric() {
        return Ok(());
    }
    if info.is_pin_protected() {
        return match pin {
            Some(pin) if !pin.is_empty() => Ok(()),
            _ => Err(EngineError::PinRequired),
        };
    }
    Err(EngineError::Unsupported(
        "device has no user-verification method".into(),
    ))
}

fn map_make_error(error: make::Error) -> EngineError {
    match error {
        make::Error::PinInvalid | make::Error::PinBlocked => EngineError::PinInvalid,
        make::Error::InvalidParameter | make::Error::MissingParameter => {
            EngineError::InvalidArgument("authenticator rejected request parameters".into())
        }
        make::Error::UnsupportedAlgorithm => {
            EngineError::InvalidArgument("unsupported algorithm, ES256 required".into())
        }
        make::Error::UnsupportedOption => {
            EngineError::Unsupported("option not supported by this device".into())
        }
        make::Error::UserActionTimeout => {
            EngineError::Internal("authenticator user action timeout".into())
        }
        make::Error::OperationDenied => {
            EngineError::Internal("authenticator denied the operation".into())
        }
        make::Error::CredentialExcluded => {
            EngineError::Internal("credential already excluded on this device".into())
        }
        make::Error::KeyStoreFull => {
            EngineError::Internal("authenticator key storage is full".into())
        }
        make::Error::UserVerificationInvalid => EngineError::UserVerification,
        make::Error::UserVerificationBlocked => {
            unreachable!("handled by the retry loop in DeviceAdapter::make_credential")
        }
        make::Error::Cancelled => EngineError::Cancelled,
    }
}

fn map_get_error(error: get::Error) -> EngineError {
    match error {
        get::Error::PinInvalid | get::Error::PinBlocked => EngineError::PinInvalid,
        get::Error::InvalidParameter | get::Error::MissingParameter => {
            EngineError::InvalidArgument("authenticator rejected request parameters".into())
        }
        get::Error::UnsupportedOption => {
            EngineError::Unsupported("option not supported by this device".into())
        }
        get::Error::UserActionTimeout => {
            EngineError::Internal("authenticator user action timeout".into())
        }
        get::Error::OperationDenied => {
            EngineError::Internal("authenticator denied the operation".into())
        }
        get::Error::NoCredentials => EngineError::NoCredentials,
        get::Error::UserVerificationInvalid => EngineError::UserVerification,
        get::Error::UserVerificationBlocked => {
            unreachable!("handled by the retry loop in DeviceAdapter::get_assertion")
        }
        get::Error::Cancelled => EngineError::Cancelled,
    }
}
