//! End-to-end ceremony behavior, driven entirely through fake hardware
//! and a fake prompt so a race can be won by whichever device a test
//! touches.

use std::sync::Arc;
use std::time::Duration;

use ctap2_proto::authenticator::device::Options;
use fido_common::credential::public_key::{Descriptor, Parameters, RelyingPartyEntity, UserEntity};
use webauthn3_proto::ConveyancePreference;

use crate::challenge::{LoginChallenge, RegisterChallenge, UserVerificationRequirement};
use crate::{login, register, CallContext, LoginOptions, RawDevice};

use super::fakes::{FakeDevice, FakeLocator, FakeOpener, FakePrompt, ResidentCredential};

fn tiny_config() -> crate::EngineConfig {
    crate::EngineConfig {
        poll_interval: Duration::from_millis(5),
        uv_retry_limit: 3,
    }
}

fn setup(devices: Vec<Arc<FakeDevice>>) -> (Arc<FakeLocator>, Arc<FakeOpener>) {
    let paths = devices.iter().map(|d| d.path().to_string()).collect();
    (
        Arc::new(FakeLocator::new(paths)),
        Arc::new(FakeOpener::new(devices)),
    )
}

#[tokio::test]
async fn mfa_single_device_wins_with_one_touch() {
    let credential_id = vec![0xAA; 16];
    let device = FakeDevice::new("dev0", true, Options::USER_VERIFICATION | Options::CLIENT_PIN)
        .with_pin("1234")
        .with_known_id(credential_id.clone())
        .into_arc();
    device.touch();
    let (locator, opener) = setup(vec![device]);

    let prompt = Arc::new(FakePrompt::new().with_pin("1234"));
    let challenge = LoginChallenge {
        challenge: vec![1, 2, 3],
        relying_party_id: "example.com".into(),
        application_id: None,
        allowed_credentials: vec![Descriptor::public_key(credential_id.clone())],
        user_verification: UserVerificationRequirement::Required,
    };

    let (response, actual_user) = login(
        CallContext::new(Duration::from_secs(2)),
        "https://example.com".into(),
        challenge,
        prompt,
        LoginOptions::default(),
        locator,
        opener,
        tiny_config(),
    )
    .await
    .expect("single device should win the race");

    assert_eq!(response.raw_id, credential_id);
    assert_eq!(actual_user, "");
}

#[tokio::test]
async fn mfa_multi_device_race_only_touched_device_wins() {
    let plain_id = vec![0x01; 8];
    let pin_id = vec![0x02; 8];
    let bio_id = vec![0x03; 8];

    let plain = FakeDevice::new("plain", true, Options::empty())
        .with_known_id(plain_id.clone())
        .into_arc();
    let pin = FakeDevice::new("pin", true, Options::CLIENT_PIN)
        .with_pin("1234")
        .with_known_id(pin_id.clone())
        .into_arc();
    let bio = FakeDevice::new("bio", true, Options::CLIENT_PIN | Options::BIO_ENROLL)
        .with_known_id(bio_id.clone())
        .into_arc();
    let legacy = FakeDevice::new("legacy", false, Options::empty()).into_arc();

    // Only the biometric device is ever touched.
    bio.touch();

    let (locator, opener) = setup(vec![
        Arc::clone(&plain),
        Arc::clone(&pin),
        Arc::clone(&bio),
        Arc::clone(&legacy),
    ]);

    let prompt = Arc::new(FakePrompt::new());
    let challenge = LoginChallenge {
        challenge: vec![4, 5, 6],
        relying_party_id: "example.com".into(),
        application_id: None,
        allowed_credentials: vec![
            Descriptor::public_key(plain_id),
            Descriptor::public_key(pin_id),
            Descriptor::public_key(bio_id.clone()),
        ],
        user_verification: UserVerificationRequirement::Discouraged,
    };

    let (response, _actual_user) = login(
        CallContext::new(Duration::from_secs(2)),
        "https://example.com".into(),
        challenge,
        prompt.clone(),
        LoginOptions::default(),
        locator,
        opener,
        tiny_config(),
    )
    .await
    .expect("biometric device should win the race");

    assert_eq!(response.raw_id, bio_id);
    assert_eq!(prompt.touch_count(), 1);
}

#[tokio::test]
async fn passwordless_pin_discovers_resident_credential() {
    let alpaca_id = vec![0xAA; 4];
    let credential_id = vec![0xBB; 4];
    let device = FakeDevice::new("dev0", true, Options::CLIENT_PIN | Options::RESIDENT_KEY)
        .with_pin("4242")
        .with_resident(ResidentCredential {
            credential_id,
            user_id: alpaca_id.clone(),
            user_name: "alpaca".into(),
            display_name: "Alpaca".into(),
        })
        .into_arc();
    device.touch();
    let (locator, opener) = setup(vec![device]);

    let prompt = Arc::new(FakePrompt::new().with_pin("4242"));
    let challenge = LoginChallenge {
        challenge: vec![7, 8, 9],
        relying_party_id: "example.com".into(),
        application_id: None,
        allowed_credentials: Vec::new(),
        user_verification: UserVerificationRequirement::Required,
    };

    let (response, actual_user) = login(
        CallContext::new(Duration::from_secs(2)),
        "https://example.com".into(),
        challenge,
        prompt.clone(),
        LoginOptions::default(),
        locator,
        opener,
        tiny_config(),
    )
    .await
    .expect("resident credential should be discovered");

    assert_eq!(response.user_handle, alpaca_id);
    assert_eq!(actual_user, "");
    assert_eq!(prompt.touch_count(), 2);
}

#[tokio::test]
async fn passwordless_biometric_multi_credential_selects_named_user() {
    let llama_id = vec![0x10; 4];
    let alpaca_id = vec![0x20; 4];
    let device = FakeDevice::new("dev0", true, Options::CLIENT_PIN | Options::BIO_ENROLL)
        .with_resident(ResidentCredential {
            credential_id: vec![0x01; 4],
            user_id: llama_id,
            user_name: "llama".into(),
            display_name: "Llama".into(),
        })
        .with_resident(ResidentCredential {
            credential_id: vec![0x02; 4],
            user_id: alpaca_id.clone(),
            user_name: "alpaca".into(),
            display_name: "Alpaca".into(),
        })
        .into_arc();
    device.touch();
    let (locator, opener) = setup(vec![device]);

    let prompt = Arc::new(FakePrompt::new());
    let challenge = LoginChallenge {
        challenge: vec![1, 1, 1],
        relying_party_id: "example.com".into(),
        application_id: None,
        allowed_credentials: Vec::new(),
        user_verification: UserVerificationRequirement::Required,
    };

    let (response, actual_user) = login(
        CallContext::new(Duration::from_secs(2)),
        "https://example.com".into(),
        challenge,
        prompt.clone(),
        LoginOptions {
            user: Some("alpaca".into()),
        },
        locator,
        opener,
        tiny_config(),
    )
    .await
    .expect("alpaca should be selected among two resident credentials");

    assert_eq!(response.user_handle, alpaca_id);
    assert_eq!(actual_user, "alpaca");
    assert_eq!(prompt.touch_count(), 1);
}

#[tokio::test]
async fn passwordless_cancel_after_pin_never_delivers_second_touch() {
    let device = FakeDevice::new("dev0", true, Options::CLIENT_PIN | Options::RESIDENT_KEY)
        .with_pin("9999")
        .with_resident(ResidentCredential {
            credential_id: vec![0x01; 4],
            user_id: vec![0x02; 4],
            user_name: "alpaca".into(),
            display_name: "Alpaca".into(),
        })
        .into_arc();
    device.touch();
    let (locator, opener) = setup(vec![device]);

    let ctx = CallContext::new(Duration::from_secs(2));
    let prompt = Arc::new(
        FakePrompt::new()
            .with_pin("9999")
            .cancelling_after_pin(ctx.cancel.clone()),
    );
    let challenge = LoginChallenge {
        challenge: vec![2, 2, 2],
        relying_party_id: "example.com".into(),
        application_id: None,
        allowed_credentials: Vec::new(),
        user_verification: UserVerificationRequirement::Required,
    };

    let result = login(
        ctx,
        "https://example.com".into(),
        challenge,
        prompt.clone(),
        LoginOptions::default(),
        locator,
        opener,
        tiny_config(),
    )
    .await;

    assert_eq!(result.unwrap_err(), crate::EngineError::Cancelled);
    assert_eq!(prompt.touch_count(), 1);
}

#[tokio::test]
async fn transient_uv_failure_is_retried_silently() {
    let credential_id = vec![0x55; 4];
    let device = FakeDevice::new("dev0", true, Options::USER_VERIFICATION | Options::CLIENT_PIN)
        .with_pin("1111")
        .with_known_id(credential_id.clone())
        .with_uv_blocked(2)
        .into_arc();
    device.touch();
    let (locator, opener) = setup(vec![device]);

    let prompt = Arc::new(FakePrompt::new().with_pin("1111"));
    let challenge = LoginChallenge {
        challenge: vec![3, 3, 3],
        relying_party_id: "example.com".into(),
        application_id: None,
        allowed_credentials: vec![Descriptor::public_key(credential_id.clone())],
        user_verification: UserVerificationRequirement::Required,
    };

    let (response, _) = login(
        CallContext::new(Duration::from_secs(2)),
        "https://example.com".into(),
        challenge,
        prompt,
        LoginOptions::default(),
        locator,
        opener,
        tiny_config(),
    )
    .await
    .expect("two transient UV failures should be retried under the default limit");

    assert_eq!(response.raw_id, credential_id);
}

#[tokio::test]
async fn uv_retry_ceiling_surfaces_internal_error() {
    let credential_id = vec![0x66; 4];
    let device = FakeDevice::new("dev0", true, Options::USER_VERIFICATION | Options::CLIENT_PIN)
        .with_pin("1111")
        .with_known_id(credential_id.clone())
        .with_uv_blocked(5)
        .into_arc();
    device.touch();
    let (locator, opener) = setup(vec![device]);

    let prompt = Arc::new(FakePrompt::new().with_pin("1111"));
    let challenge = LoginChallenge {
        challenge: vec![9, 9, 9],
        relying_party_id: "example.com".into(),
        application_id: None,
        allowed_credentials: vec![Descriptor::public_key(credential_id)],
        user_verification: UserVerificationRequirement::Required,
    };

    let result = login(
        CallContext::new(Duration::from_secs(2)),
        "https://example.com".into(),
        challenge,
        prompt,
        LoginOptions::default(),
        locator,
        opener,
        tiny_config(),
    )
    .await;

    match result {
        Err(crate::EngineError::Internal(message)) => {
            assert!(message.contains("libfido2 error 63"));
        }
        other => panic!("expected an exhausted-retry internal error, got {other:?}"),
    }
}

#[tokio::test]
async fn legacy_u2f_device_falls_back_to_appid() {
    let credential_id = vec![0x77; 4];
    let device = FakeDevice::new("dev0", false, Options::empty())
        .with_known_id(credential_id.clone())
        .into_arc();
    device.touch();
    let (locator, opener) = setup(vec![device]);

    let prompt = Arc::new(FakePrompt::new());
    let challenge = LoginChallenge {
        challenge: vec![4, 4, 4],
        relying_party_id: "example.com".into(),
        application_id: Some("https://example.com".into()),
        allowed_credentials: vec![Descriptor::public_key(credential_id.clone())],
        user_verification: UserVerificationRequirement::Discouraged,
    };

    let (response, _) = login(
        CallContext::new(Duration::from_secs(2)),
        "https://example.com".into(),
        challenge,
        prompt,
        LoginOptions::default(),
        locator,
        opener,
        tiny_config(),
    )
    .await
    .expect("legacy device should authenticate through the appid fallback");

    assert_eq!(response.raw_id, credential_id);
    assert_eq!(response.app_id_used, Some(true));
}

fn base_register_challenge(user_id: Vec<u8>, resident_key: bool) -> RegisterChallenge {
    RegisterChallenge {
        challenge: vec![1, 2, 3],
        relying_party: RelyingPartyEntity {
            id: "example.com".into(),
            name: "Example".into(),
        },
        user: UserEntity {
            id: user_id,
            name: "alpaca".into(),
            display_name: "Alpaca".into(),
        },
        credential_parameters: vec![Parameters::es256()],
        excluded_credentials: Vec::new(),
        attestation: ConveyancePreference::None,
        resident_key,
        user_verification: UserVerificationRequirement::Required,
    }
}

#[tokio::test]
async fn register_resident_key_requires_capable_device() {
    let device = FakeDevice::new(
        "dev0",
        true,
        Options::CLIENT_PIN | Options::RESIDENT_KEY,
    )
    .with_pin("1234")
    .into_arc();
    device.touch();
    let (locator, opener) = setup(vec![device]);

    let prompt = Arc::new(FakePrompt::new().with_pin("1234"));
    let challenge = base_register_challenge(vec![0xEE; 4], true);

    let response = register(
        CallContext::new(Duration::from_secs(2)),
        "https://example.com".into(),
        challenge,
        prompt,
        locator,
        opener,
        tiny_config(),
    )
    .await
    .expect("resident-key-capable device should register");

    assert_eq!(response.raw_id, vec![0xEE; 4]);
}
