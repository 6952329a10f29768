use coset::CborSerializable;
use ctap2_proto::authenticator::{credential::make, Data, Sha256Hash};
use fido_common::attestation::Statement;
use serde::Serialize;
use serde_bytes::ByteBuf;
use webauthn3_proto::{ClientDataType, CollectedClientData, LoginResponse, RegisterResponse};

const FLAG_USER_PRESENT: u8 = 0b0000_0001;
const FLAG_USER_VERIFIED: u8 = 0b0000_0100;
const FLAG_ATTESTED_DATA: u8 = 0b0100_0000;

/// Component E. Shapes a winning worker's raw CTAP2 output into the
/// public `WebAuthn`-shaped response, never the other way round — the
/// engine never parses or validates a response it is building.
pub(crate) struct Assembler {
    origin: String,
}

impl Assembler {
    pub(crate) fn new(origin: String) -> Self {
        Self { origin }
    }

    pub(crate) fn client_data_hash(&self, data_type: ClientDataType, challenge: &[u8]) -> (Sha256Hash, String) {
        let client_data = CollectedClientData {
            data_type,
            challenge: challenge.to_vec(),
            origin: self.origin.clone(),
        };
        (client_data.hash(), client_data.to_json())
    }

    pub(crate) fn register(
        &self,
        client_data_json: String,
        response: make::Response,
    ) -> RegisterResponse {
        let raw_id = response
            .authenticator_data
            .attested_credential_data
            .as_ref()
            .map(|data| data.credential_id.clone())
            .unwrap_or_default();

        let auth_data = encode_authenticator_data(&response.authenticator_data);
        let attestation_object = encode_attestation_object(
            response.format,
            auth_data,
            response.attestation_statement,
        );

        RegisterResponse {
            raw_id,
            attestation_object,
            client_data_json,
        }
    }

    pub(crate) fn login(
        &self,
        client_data_json: String,
        raw_id: Vec<u8>,
        auth_data: Vec<u8>,
        signature: Vec<u8>,
        user_handle: Vec<u8>,
        app_id_used: Option<bool>,
    ) -> LoginResponse {
        LoginResponse {
            raw_id,
            authenticator_data: auth_data,
            signature,
            user_handle,
            client_data_json,
            app_id_used,
        }
    }
}

/// Packs the authenticator data record into the binary layout WebAuthn
/// relying parties expect: `rpIdHash(32) || flags(1) || signCount(4,BE)
/// || attestedCredentialData?`.
pub(crate) fn encode_authenticator_data(data: &Data) -> Vec<u8> {
    let mut out = Vec::with_capacity(37);
    out.extend_from_slice(&data.relying_party_id_hash);

    let mut flags = 0u8;
    if data.user_is_present {
        flags |= FLAG_USER_PRESENT;
    }
    if data.user_is_verified {
        flags |= FLAG_USER_VERIFIED;
    }
    if data.attested_credential_data.is_some() {
        flags |= FLAG_ATTESTED_DATA;
    }
    out.push(flags);
    out.extend_from_slice(&data.signature_counter.to_be_bytes());

    if let Some(attested) = &data.attested_credential_data {
        out.extend_from_slice(&attested.aaguid);
        out.extend_from_slice(&(attested.credential_id.len() as u16).to_be_bytes());
        out.extend_from_slice(&attested.credential_id);
        let key_bytes = attested
            .credential_public_key
            .clone()
            .to_vec()
            .expect("COSE key CBOR encoding is infallible for a well-formed key");
        out.extend_from_slice(&key_bytes);
    }

    out
}

#[derive(Serialize)]
struct AttestationObjectWire {
    fmt: &'static str,
    #[serde(rename = "authData")]
    auth_data: ByteBuf,
    #[serde(rename = "attStmt")]
    att_stmt: AttestationStatementWire,
}

#[derive(Serialize)]
struct AttestationStatementWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    alg: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sig: Option<ByteBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    x5c: Option<Vec<ByteBuf>>,
}

fn encode_attestation_object(
    format: fido_common::attestation::FormatIdentifier,
    auth_data: Vec<u8>,
    statement: Statement,
) -> Vec<u8> {
    let (fmt, att_stmt) = match statement {
        Statement::Packed {
            algorithm,
            signature,
            certificates,
        } => (
            "packed",
            AttestationStatementWire {
                alg: Some(algorithm),
                sig: Some(ByteBuf::from(signature)),
                x5c: Some(certificates.into_iter().map(ByteBuf::from).collect()),
            },
        ),
        Statement::FidoU2F {
            signature,
            certificates,
        } => (
            "fido-u2f",
            AttestationStatementWire {
                alg: None,
                sig: Some(ByteBuf::from(signature)),
                x5c: Some(certificates.into_iter().map(ByteBuf::from).collect()),
            },
        ),
        Statement::None => (
            "none",
            AttestationStatementWire {
                alg: None,
                sig: None,
                x5c: None,
            },
        ),
    };
    debug_assert_eq!(fmt, format_name(format));

    let wire = AttestationObjectWire {
        fmt,
        auth_data: ByteBuf::from(auth_data),
        att_stmt,
    };

    let mut out = Vec::new();
    ciborium::ser::into_writer(&wire, &mut out)
        .expect("attestation object CBOR encoding is infallible for an in-memory buffer");
    out
}

fn format_name(format: fido_common::attestation::FormatIdentifier) -> &'static str {
    use fido_common::attestation::FormatIdentifier;
    match format {
        FormatIdentifier::Packed => "packed",
        FormatIdentifier::FidoU2F => "fido-u2f",
        FormatIdentifier::None => "none",
        _ => "none",
    }
}
