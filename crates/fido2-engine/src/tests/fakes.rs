//! Test doubles standing in for physical hardware, the host UI, and
//! device enumeration. [`FakeDevice`] tracks "has this device been
//! touched yet" with a condition-variable-like rendezvous rather than
//! actually blocking on hardware, so a test drives a race by calling
//! `touch()` on whichever device should win.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use ctap2_proto::authenticator::{
    assertion::get,
    credential::make,
    device::{Info, Options},
    Data,
};
use fido_common::attestation::{CredentialData, FormatIdentifier, Statement};
use fido_common::credential::public_key::{Descriptor, UserEntity, COSE_ALGORITHM_ES256};

use crate::device::{DeviceLocator, DeviceOpener, Probe, RawDevice};
use crate::prompt::{CredentialChoice, Prompt};

pub(crate) struct ResidentCredential {
    pub credential_id: Vec<u8>,
    pub user_id: Vec<u8>,
    pub user_name: String,
    pub display_name: String,
}

pub(crate) struct FakeDevice {
    path: String,
    fido2: bool,
    options: Options,
    pin: Option<String>,
    known_ids: Vec<Vec<u8>>,
    resident: Mutex<Vec<ResidentCredential>>,
    touched: Mutex<bool>,
    touch_notify: Notify,
    cancel: CancellationToken,
    uv_blocked_remaining: Mutex<u8>,
}

impl FakeDevice {
    pub(crate) fn new(path: &str, fido2: bool, options: Options) -> Self {
        Self {
            path: path.to_string(),
            fido2,
            options,
            pin: None,
            known_ids: Vec::new(),
            resident: Mutex::new(Vec::new()),
            touched: Mutex::new(false),
            touch_notify: Notify::new(),
            cancel: CancellationToken::new(),
            uv_blocked_remaining: Mutex::new(0),
        }
    }

    pub(crate) fn with_pin(mut self, pin: &str) -> Self {
        self.pin = Some(pin.to_string());
        self
    }

    pub(crate) fn with_known_id(mut self, id: Vec<u8>) -> Self {
        self.known_ids.push(id);
        self
    }

    pub(crate) fn with_resident(mut self, credential: ResidentCredential) -> Self {
        self.resident.get_mut().unwrap().push(credential);
        self
    }

    pub(crate) fn with_uv_blocked(mut self, attempts: u8) -> Self {
        *self.uv_blocked_remaining.get_mut().unwrap() = attempts;
        self
    }

    pub(crate) fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Simulates the user physically touching this device. Safe to call
    /// before or after the ceremony starts racing it.
    pub(crate) fn touch(&self) {
        *self.touched.lock().unwrap() = true;
        self.touch_notify.notify_waiters();
    }

    async fn await_touch(&self) -> Result<(), ()> {
        loop {
            if *self.touched.lock().unwrap() {
                return Ok(());
            }
            tokio::select! {
                _ = self.touch_notify.notified() => {}
                _ = self.cancel.cancelled() => return Err(()),
            }
        }
    }

    fn check_uv<E>(
        &self,
        wants_uv: bool,
        pin: Option<&str>,
        blocked: E,
        invalid: E,
        pin_invalid: E,
    ) -> Result<(), E> {
        if !wants_uv {
            return Ok(());
        }
        let mut remaining = self.uv_blocked_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(blocked);
        }
        drop(remaining);

        if self.options.contains(Options::BIO_ENROLL) {
            Ok(())
        } else if self.options.contains(Options::CLIENT_PIN) {
            if pin == self.pin.as_deref() {
                Ok(())
            } else {
                Err(pin_invalid)
            }
        } else {
            Err(invalid)
        }
    }
}

fn fake_cose_key() -> coset::CoseKey {
    coset::CoseKeyBuilder::new_ec2_pub_key(
        coset::iana::EllipticCurve::P_256,
        vec![0x11; 32],
        vec![0x22; 32],
    )
    .algorithm(coset::iana::Algorithm::ES256)
    .build()
}

#[async_trait]
impl RawDevice for FakeDevice {
    fn path(&self) -> &str {
        &self.path
    }

    async fn probe(&self) -> Result<Probe, ()> {
        if self.fido2 {
            Ok(Probe::Fido2(Info {
                versions: vec!["FIDO_2_0".to_string()],
                aaguid: [0; 16],
                options: self.options,
            }))
        } else {
            Ok(Probe::NotFido2)
        }
    }

    async fn make_credential(
        &self,
        request: make::Request,
    ) -> Result<make::Response, make::Error> {
        if self.await_touch().await.is_err() {
            return Err(make::Error::Cancelled);
        }

        let wants_uv = request.options.get(&make::OptionKey::UserVerification) == Some(&true);
        self.check_uv(
            wants_uv,
            request.pin.as_deref(),
            make::Error::UserVerificationBlocked,
            make::Error::UserVerificationInvalid,
            make::Error::PinInvalid,
        )?;

        if request
            .exclude_list
            .iter()
            .any(|descriptor| self.known_ids.contains(&descriptor.id))
        {
            return Err(make::Error::CredentialExcluded);
        }

        let resident_key = request.options.get(&make::OptionKey::Discoverable) == Some(&true);
        let credential_id = request.user.id.clone();

        if resident_key {
            self.resident.lock().unwrap().push(ResidentCredential {
                credential_id: credential_id.clone(),
                user_id: request.user.id.clone(),
                user_name: request.user.name.clone(),
                display_name: request.user.display_name.clone(),
            });
        }

        Ok(make::Response {
            format: FormatIdentifier::Packed,
            authenticator_data: Data {
                relying_party_id_hash: [0u8; 32],
                user_is_present: true,
                user_is_verified: wants_uv,
                signature_counter: 1,
                attested_credential_data: Some(CredentialData {
                    aaguid: [0; 16],
                    credential_id,
                    credential_public_key: fake_cose_key(),
                }),
            },
            attestation_statement: Statement::Packed {
                algorithm: COSE_ALGORITHM_ES256,
                signature: vec![0xAB; 8],
                certificates: vec![vec![0xCD; 4]],
            },
        })
    }

    async fn get_assertion(
        &self,
        request: get::Request,
    ) -> Result<Vec<get::Response>, get::Error> {
        if self.await_touch().await.is_err() {
            return Err(get::Error::Cancelled);
        }

        let wants_uv = request.options.get(&get::OptionKey::UserVerification) == Some(&true);
        self.check_uv(
            wants_uv,
            request.pin.as_deref(),
            get::Error::UserVerificationBlocked,
            get::Error::UserVerificationInvalid,
            get::Error::PinInvalid,
        )?;

        if !request.allow_list.is_empty() {
            let matched = request
                .allow_list
                .iter()
                .find(|descriptor| self.known_ids.contains(&descriptor.id));
            return match matched {
                Some(descriptor) => Ok(vec![get::Response {
                    credential: Some(descriptor.clone()),
                    auth_data: vec![0u8; 37],
                    signature: vec![0xEF; 8],
                    user: None,
                    number_of_credentials: None,
                }]),
                None => Err(get::Error::NoCredentials),
            };
        }

        if !wants_uv {
            // Selection probe: confirms presence without disclosing
            // resident credentials (§4.D.2's "no resident access" touch).
            return Ok(vec![get::Response {
                credential: None,
                auth_data: vec![0u8; 37],
                signature: Vec::new(),
                user: None,
                number_of_credentials: None,
            }]);
        }

        let resident = self.resident.lock().unwrap();
        if resident.is_empty() {
            return Err(get::Error::NoCredentials);
        }
        let count = resident.len();
        Ok(resident
            .iter()
            .map(|credential| get::Response {
                credential: Some(Descriptor::public_key(credential.credential_id.clone())),
                auth_data: vec![0u8; 37],
                signature: vec![0x12; 8],
                user: Some(UserEntity {
                    id: credential.user_id.clone(),
                    name: if count == 1 {
                        String::new()
                    } else {
                        credential.user_name.clone()
                    },
                    display_name: if count == 1 {
                        String::new()
                    } else {
                        credential.display_name.clone()
                    },
                }),
                number_of_credentials: Some(count),
            })
            .collect())
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }
}

pub(crate) struct FakeLocator {
    paths: Vec<String>,
}

impl FakeLocator {
    pub(crate) fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl DeviceLocator for FakeLocator {
    async fn current_locations(&self) -> Vec<String> {
        self.paths.clone()
    }
}

pub(crate) struct FakeOpener {
    devices: HashMap<String, Arc<dyn RawDevice>>,
}

impl FakeOpener {
    pub(crate) fn new(devices: Vec<Arc<FakeDevice>>) -> Self {
        let devices = devices
            .into_iter()
            .map(|device| (device.path().to_string(), device as Arc<dyn RawDevice>))
            .collect();
        Self { devices }
    }
}

#[async_trait]
impl DeviceOpener for FakeOpener {
    async fn open(&self, path: &str) -> Option<Arc<dyn RawDevice>> {
        self.devices.get(path).cloned()
    }
}

/// Records every invocation in order so a test can assert the touch
/// count §8 demands, and optionally cancels a shared token right after
/// supplying the PIN to model "user cancels mid-ceremony".
pub(crate) struct FakePrompt {
    touches: AtomicUsize,
    pin_to_supply: String,
    cancel_after_pin: Option<CancellationToken>,
}

impl FakePrompt {
    pub(crate) fn new() -> Self {
        Self {
            touches: AtomicUsize::new(0),
            pin_to_supply: String::new(),
            cancel_after_pin: None,
        }
    }

    pub(crate) fn with_pin(mut self, pin: &str) -> Self {
        self.pin_to_supply = pin.to_string();
        self
    }

    pub(crate) fn cancelling_after_pin(mut self, cancel: CancellationToken) -> Self {
        self.cancel_after_pin = Some(cancel);
        self
    }

    pub(crate) fn touch_count(&self) -> usize {
        self.touches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prompt for FakePrompt {
    async fn prompt_touch(&self) {
        self.touches.fetch_add(1, Ordering::SeqCst);
    }

    async fn prompt_pin(&self) -> String {
        if let Some(cancel) = &self.cancel_after_pin {
            cancel.cancel();
        }
        self.pin_to_supply.clone()
    }

    async fn prompt_credential(&self, choices: &[CredentialChoice]) -> CredentialChoice {
        choices[0].clone()
    }
}
