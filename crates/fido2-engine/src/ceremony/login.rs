use std::sync::Arc;
use std::time::Duration;

use ctap2_proto::authenticator::assertion::get;
use fido_common::credential::public_key::{Descriptor, UserEntity};
use tokio_util::sync::CancellationToken;
use webauthn3_proto::{ClientDataType, LoginResponse};

use crate::assembler::Assembler;
use crate::challenge::LoginChallenge;
use crate::device::{DeviceLocator, DeviceOpener, GetAssertionCall};
use crate::error::EngineError;
use crate::prompt::{CredentialChoice, Prompt};
use crate::{EngineConfig, LoginOptions};

use super::worker::{self, run_race, Candidate, Outcome};
use super::Mediator;

/// Component D, login half. Validates the challenge, discovers devices,
/// and runs either the MFA or passwordless race described in §4.D.2, all
/// inside the caller's deadline.
pub async fn login(
    origin: String,
    challenge: LoginChallenge,
    prompt: Arc<dyn Prompt>,
    opts: LoginOptions,
    locator: Arc<dyn DeviceLocator>,
    opener: Arc<dyn DeviceOpener>,
    config: EngineConfig,
    deadline: Duration,
    cancel: CancellationToken,
) -> Result<(LoginResponse, String), EngineError> {
    challenge.validate(&origin)?;

    match tokio::time::timeout(
        deadline,
        login_inner(origin, challenge, prompt, opts, locator, opener, config, cancel.clone()),
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

async fn login_inner(
    origin: String,
    challenge: LoginChallenge,
    prompt: Arc<dyn Prompt>,
    opts: LoginOptions,
    locator: Arc<dyn DeviceLocator>,
    opener: Arc<dyn DeviceOpener>,
    config: EngineConfig,
    cancel: CancellationToken,
) -> Result<(LoginResponse, String), EngineError> {
    let mediator = Arc::new(Mediator::new(prompt));
    let assembler = Assembler::new(origin);
    let (hash, client_data_json) =
        assembler.client_data_hash(ClientDataType::Get, &challenge.challenge);

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

    let (responses, app_id_used) = if challenge.is_passwordless() {
        login_passwordless(candidates, &challenge, &mediator, hash, &cancel).await?
    } else {
        login_mfa(candidates, &challenge, &mediator, hash, &cancel).await?
    };

    let (response, actual_user) = select_assertion(responses, &opts, &mediator).await?;

    let raw_id = response
        .credential
        .as_ref()
        .map(|descriptor| descriptor.id.clone())
        .or_else(|| single_allowed_id(&challenge))
        .unwrap_or_default();
    let user_handle = response
        .user
        .as_ref()
        .map(|user| user.id.clone())
        .unwrap_or_default();

    let login_response = assembler.login(
        client_data_json,
        raw_id,
        response.auth_data,
        response.signature,
        user_handle,
        app_id_used,
    );
    Ok((login_response, actual_user))
}

fn single_allowed_id(challenge: &LoginChallenge) -> Option<Vec<u8>> {
    match challenge.allowed_credentials.as_slice() {
        [only] => Some(only.id.clone()),
        _ => None,
    }
}

/// MFA race: every eligible candidate calls `assertion` once (retrying a
/// PIN if UV is required), the first success wins. A legacy U2F device is
/// only eligible when the challenge carries an `appid` to authenticate
/// against (§4.D.4).
async fn login_mfa(
    candidates: Vec<Arc<Candidate>>,
    challenge: &LoginChallenge,
    mediator: &Arc<Mediator>,
    hash: ctap2_proto::authenticator::Sha256Hash,
    cancel: &CancellationToken,
) -> Result<(Vec<get::Response>, Option<bool>), EngineError> {
    let eligible: Vec<Arc<Candidate>> = candidates
        .into_iter()
        .filter(|candidate| candidate.is_fido2() || challenge.application_id.is_some())
        .collect();
    if eligible.is_empty() {
        return Err(EngineError::NoCredentials);
    }

    mediator.touch().await;

    let require_uv = challenge.user_verification.is_required();
    let allow_list = challenge.allowed_credentials.clone();
    let rp_id = challenge.relying_party_id.clone();
    let app_id = challenge.application_id.clone();
    let mediator = Arc::clone(mediator);
    let race_cancel = cancel.child_token();

    run_race(eligible, race_cancel, move |candidate, winner, race_cancel| {
        let mediator = Arc::clone(&mediator);
        let allow_list = allow_list.clone();
        let rp_id = rp_id.clone();
        let app_id = app_id.clone();
        async move {
            let info = candidate.effective_info();
            let use_app_id = !candidate.is_fido2();
            let effective_rp_id = if use_app_id {
                app_id.clone().unwrap_or_default()
            } else {
                rp_id.clone()
            };

            let mut pin = None;
            if require_uv && !use_app_id && info.is_pin_protected() {
                pin = Some(mediator.pin().await);
            }

            let call = GetAssertionCall {
                relying_party_id: effective_rp_id,
                client_data_hash: hash,
                allow_list: allow_list.clone(),
                pin,
                require_uv: require_uv && !use_app_id,
            };

            let result = worker::race_aware(
                &candidate.adapter,
                &race_cancel,
                candidate.adapter.get_assertion(&info, call),
            )
            .await;

            match result {
                Ok(responses) => {
                    if winner.try_set((responses, use_app_id)).await {
                        tracing::info!(path = %candidate.adapter.path(), "device won login race");
                        Outcome::Won
                    } else {
                        Outcome::Lost
                    }
                }
                Err(err) => Outcome::Failed(err),
            }
        }
    })
    .await
    .map(|(responses, app_id_used)| (responses, Some(app_id_used).filter(|used| *used)))
}

/// What a passwordless selection-race worker discovered.
enum Selection {
    /// A biometric device: its single call already performed both
    /// selection and verification (§4.D.2, one physical interaction).
    Biometric(Vec<get::Response>),
    /// A PIN device: only selection (user presence) has happened so far;
    /// the ceremony still owes it a PIN prompt and a second touch.
    Pin(Arc<Candidate>),
}

async fn login_passwordless(
    candidates: Vec<Arc<Candidate>>,
    challenge: &LoginChallenge,
    mediator: &Arc<Mediator>,
    hash: ctap2_proto::authenticator::Sha256Hash,
    cancel: &CancellationToken,
) -> Result<(Vec<get::Response>, Option<bool>), EngineError> {
    let eligible: Vec<Arc<Candidate>> = candidates
        .into_iter()
        .filter(|candidate| {
            let info = candidate.effective_info();
            info.is_biometric() || info.is_pin_protected()
        })
        .collect();
    if eligible.is_empty() {
        return Err(EngineError::NoCredentials);
    }

    mediator.touch().await;

    let rp_id = challenge.relying_party_id.clone();
    let race_cancel = cancel.child_token();

    let selection = run_race(eligible, race_cancel, move |candidate, winner, race_cancel| {
        let rp_id = rp_id.clone();
        async move {
            let info = candidate.effective_info();
            if info.is_biometric() {
                let call = GetAssertionCall {
                    relying_party_id: rp_id.clone(),
                    client_data_hash: hash,
                    allow_list: Vec::new(),
                    pin: None,
                    require_uv: true,
                };
                let result = worker::race_aware(
                    &candidate.adapter,
                    &race_cancel,
                    candidate.adapter.get_assertion(&info, call),
                )
                .await;
                match result {
                    Ok(responses) => {
                        if winner.try_set(Selection::Biometric(responses)).await {
                            tracing::info!(path = %candidate.adapter.path(), "biometric device won selection race");
                            Outcome::Won
                        } else {
                            Outcome::Lost
                        }
                    }
                    Err(err) => Outcome::Failed(err),
                }
            } else {
                // PIN device: a UP-only selection probe. No UV key is set
                // at all (never `false` — CTAP2 forbids that), and an
                // empty allow list here must not disclose any resident
                // credential; its result is discarded.
                let call = GetAssertionCall {
                    relying_party_id: rp_id.clone(),
                    client_data_hash: hash,
                    allow_list: Vec::new(),
                    pin: None,
                    require_uv: false,
                };
                let result = worker::race_aware(
                    &candidate.adapter,
                    &race_cancel,
                    candidate.adapter.get_assertion(&info, call),
                )
                .await;
                match result {
                    Ok(_probe) => {
                        if winner.try_set(Selection::Pin(Arc::clone(&candidate))).await {
                            tracing::info!(path = %candidate.adapter.path(), "PIN device won selection race");
                            Outcome::Won
                        } else {
                            Outcome::Lost
                        }
                    }
                    Err(err) => Outcome::Failed(err),
                }
            }
        }
    })
    .await?;

    match selection {
        Selection::Biometric(responses) => Ok((responses, None)),
        Selection::Pin(candidate) => {
            let pin = mediator.pin().await;
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            mediator.touch().await;

            let info = candidate.effective_info();
            let call = GetAssertionCall {
                relying_party_id: challenge.relying_party_id.clone(),
                client_data_hash: hash,
                allow_list: Vec::new(),
                pin: Some(pin),
                require_uv: true,
            };
            let responses = candidate.adapter.get_assertion(&info, call).await?;
            Ok((responses, None))
        }
    }
}

/// Picks among however many assertions the winning device returned,
/// applying `opts.user` or the credential picker as §4.D.2 step 4
/// describes.
async fn select_assertion(
    mut responses: Vec<get::Response>,
    opts: &LoginOptions,
    mediator: &Mediator,
) -> Result<(get::Response, String), EngineError> {
    if responses.is_empty() {
        return Err(EngineError::NoCredentials);
    }

    if responses.len() == 1 {
        let response = responses.remove(0);
        if let Some(wanted) = &opts.user {
            if let Some(user) = &response.user {
                if &user.name != wanted {
                    return Err(EngineError::NoCredentials);
                }
            }
        }
        return Ok((response, String::new()));
    }

    if let Some(wanted) = &opts.user {
        let position = responses
            .iter()
            .position(|response| response.user.as_ref().map(|user| &user.name) == Some(wanted));
        return match position {
            Some(index) => Ok((responses.remove(index), wanted.clone())),
            None => Err(EngineError::NoCredentials),
        };
    }

    let choices: Vec<CredentialChoice> = responses
        .iter()
        .map(|response| CredentialChoice {
            descriptor: response
                .credential
                .clone()
                .unwrap_or_else(|| Descriptor::public_key(Vec::new())),
            user: response.user.clone().unwrap_or_else(|| UserEntity {
                id: Vec::new(),
                name: String::new(),
                display_name: String::new(),
            }),
        })
        .collect();

    let chosen = mediator.credential(&choices).await;
    let index = responses
        .iter()
        .position(|response| response.credential.as_ref() == Some(&chosen.descriptor))
        .ok_or(EngineError::NoCredentials)?;
    let actual_user = chosen.user.name.clone();
    Ok((responses.remove(index), actual_user))
}
