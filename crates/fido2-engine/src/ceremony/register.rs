use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use webauthn3_proto::{ClientDataType, RegisterResponse};

use crate::assembler::Assembler;
use crate::challenge::RegisterChallenge;
use crate::device::{DeviceLocator, DeviceOpener, MakeCredentialCall};
use crate::error::EngineError;
use crate::prompt::Prompt;
use crate::EngineConfig;

use super::worker::{self, run_race, Candidate, Outcome};
use super::Mediator;

/// Component D, register half. Validates the challenge, discovers
/// devices, and runs the MFA or resident-key race described in §4.D.3,
/// all inside the caller's deadline.
pub async fn register(
    origin: String,
    challenge: RegisterChallenge,
    prompt: Arc<dyn Prompt>,
    locator: Arc<dyn DeviceLocator>,
    opener: Arc<dyn DeviceOpener>,
    config: EngineConfig,
    deadline: Duration,
    cancel: CancellationToken,
) -> Result<RegisterResponse, EngineError> {
    challenge.validate(&origin)?;

    match tokio::time::timeout(
        deadline,
        register_inner(origin, challenge, prompt, locator, opener, config, cancel.clone()),
    )
    .await
    {
        Ok(result) => result,
        Err(_elapsed) => {
            cancel.cancel();
            Err(EngineError::DeadlineExceeded)
        }
    }
}

async fn register_inner(
    origin: String,
    challenge: RegisterChallenge,
    prompt: Arc<dyn Prompt>,
    locator: Arc<dyn DeviceLocator>,
    opener: Arc<dyn DeviceOpener>,
    config: EngineConfig,
    cancel: CancellationToken,
) -> Result<RegisterResponse, EngineError> {
    let mediator = Arc::new(Mediator::new(prompt));
    let assembler = Assembler::new(origin);
    let (hash, client_data_json) =
        assembler.client_data_hash(ClientDataType::Create, &challenge.challenge);

    let candidates: Vec<Arc<Candidate>> = worker::discover(
        &locator,
        &opener,
        config.poll_interval,
        config.uv_retry_limit,
        &cancel,
    )
    .await
    .into_iter()
    .map(Arc::new)
    .collect();

    if candidates.is_empty() {
        return Err(EngineError::Cancelled);
    }

    let resident_key = challenge.resident_key;
    let eligible: Vec<Arc<Candidate>> = candidates
        .into_iter()
        .filter(|candidate| {
            if !resident_key {
                return true;
            }
            let info = candidate.effective_info();
            info.supports_resident_key() && info.supports_user_verification()
        })
        .collect();
    if eligible.is_empty() {
        return Err(EngineError::Unsupported(
            "no connected device supports a resident-key credential".into(),
        ));
    }

    mediator.touch().await;

    let require_uv = resident_key || challenge.user_verification.is_required();
    let relying_party = challenge.relying_party.clone();
    let user = challenge.user.clone();
    let exclude_list = challenge.excluded_credentials.clone();
    let mediator = Arc::clone(&mediator);
    let race_cancel = cancel.child_token();

    let response = run_race(eligible, race_cancel, move |candidate, winner, race_cancel| {
        let mediator = Arc::clone(&mediator);
        let relying_party = relying_party.clone();
        let user = user.clone();
        let exclude_list = exclude_list.clone();
        async move {
            let info = candidate.effective_info();

            let mut pin = None;
            if require_uv && info.is_pin_protected() {
                pin = Some(mediator.pin().await);
            }

            let call = MakeCredentialCall {
                client_data_hash: hash,
                relying_party,
                user,
                exclude_list,
                pin,
                resident_key,
                require_uv,
            };

            let result = worker::race_aware(
                &candidate.adapter,
                &race_cancel,
                candidate.adapter.make_credential(&info, call),
            )
            .await;

            match result {
                Ok(response) => {
                    if winner.try_set(response).await {
                        tracing::info!(path = %candidate.adapter.path(), "device won registration race");
                        Outcome::Won
                    } else {
                        Outcome::Lost
                    }
                }
                Err(err) => Outcome::Failed(err),
            }
        }
    })
    .await?;

    Ok(assembler.register(client_data_json, response))
}
