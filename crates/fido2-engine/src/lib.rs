//! Client-side orchestration engine that drives one or more attached
//! FIDO2/CTAP2 authenticators through WebAuthn registration and
//! authentication, including the passwordless resident-credential flow.
//!
//! The engine itself owns no transport and no UI: hosts plug in a
//! [`RawDevice`] per physical authenticator, a [`DeviceLocator`] /
//! [`DeviceOpener`] pair to enumerate and open them, and a [`Prompt`] to
//! surface touch/PIN/credential-picker requests. [`register`] and
//! [`login`] drive the rest.

mod assembler;
mod ceremony;
mod challenge;
mod config;
mod device;
mod error;
mod prompt;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use webauthn3_proto::{LoginResponse, RegisterResponse};

pub use challenge::{LoginChallenge, RegisterChallenge, UserVerificationRequirement};
pub use config::{fido2_enabled as is_fido2_available, EngineConfig};
pub use device::{DeviceLocator, DeviceOpener, Probe, RawDevice};
pub use error::EngineError;
pub use prompt::{CredentialChoice, Prompt};

/// Narrows a [`login`] call down to a single named user among several
/// resident credentials a device holds.
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    pub user: Option<String>,
}

/// Cancellable, deadline-bound call context every public entry point
/// takes: `deadline` is the caller's overall timeout (the engine adds no
/// deadline of its own, per §5), `cancel` is an externally triggerable
/// cancellation the caller (or a `Prompt` implementation) can fire.
#[derive(Clone)]
pub struct CallContext {
    pub deadline: Duration,
    pub cancel: CancellationToken,
}

impl CallContext {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            cancel: CancellationToken::new(),
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Mints a new credential on whichever attached device satisfies
/// `challenge` first (§4.D.3).
#[tracing::instrument(skip_all, fields(relying_party_id = %challenge.relying_party.id))]
pub async fn register(
    ctx: CallContext,
    origin: String,
    challenge: RegisterChallenge,
    prompt: Arc<dyn Prompt>,
    locator: Arc<dyn DeviceLocator>,
    opener: Arc<dyn DeviceOpener>,
    config: EngineConfig,
) -> Result<RegisterResponse, EngineError> {
    let result = ceremony::register(
        origin,
        challenge,
        prompt,
        locator,
        opener,
        config,
        ctx.deadline,
        ctx.cancel,
    )
    .await;

    if let Err(err) = &result {
        tracing::error!(error = %err, "register ceremony failed");
    }

    result
}

/// Asserts an existing credential (MFA) or discovers a resident one
/// (passwordless) on whichever attached device satisfies `challenge`
/// first (§4.D.2). `actual_user` is non-empty only when more than one
/// resident credential was available and one was selected by name.
#[tracing::instrument(skip_all, fields(relying_party_id = %challenge.relying_party_id))]
pub async fn login(
    ctx: CallContext,
    origin: String,
    challenge: LoginChallenge,
    prompt: Arc<dyn Prompt>,
    opts: LoginOptions,
    locator: Arc<dyn DeviceLocator>,
    opener: Arc<dyn DeviceOpener>,
    config: EngineConfig,
) -> Result<(LoginResponse, String), EngineError> {
    let result = ceremony::login(
        origin,
        challenge,
        prompt,
        opts,
        locator,
        opener,
        config,
        ctx.deadline,
        ctx.cancel,
    )
    .await;

    if let Err(err) = &result {
        tracing::error!(error = %err, "login ceremony failed");
    }

    result
}
