use async_trait::async_trait;
use fido_common::credential::public_key::{Descriptor, UserEntity};

/// A resident credential offered to [`Prompt::prompt_credential`] for the
/// user to pick from.
#[derive(Debug, Clone)]
pub struct CredentialChoice {
    pub descriptor: Descriptor,
    pub user: UserEntity,
}

/// Component C. The engine owns no UI; the host supplies an
/// implementation of this trait to surface PIN, touch, and
/// credential-picker requests and forward the answers back.
///
/// The ceremony serializes every call through a single `tokio::sync::Mutex`
/// (see `ceremony::Mediator`), so an implementation never needs to guard
/// against concurrent invocation.
#[async_trait]
pub trait Prompt: Send + Sync {
    /// Informs the user a touch is required now. Called once per expected
    /// physical touch — never speculatively, never twice for the same
    /// gesture.
    async fn prompt_touch(&self);

    /// Blocks until the user supplies a PIN, or returns an empty string
    /// for "no PIN provided". May trigger cancellation of the surrounding
    /// ceremony instead of returning (e.g. the user clicks "cancel").
    async fn prompt_pin(&self) -> String;

    /// Invoked when more than one resident credential is eligible after
    /// UV, to let the user choose among them.
    async fn prompt_credential(&self, choices: &[CredentialChoice]) -> CredentialChoice;
}
