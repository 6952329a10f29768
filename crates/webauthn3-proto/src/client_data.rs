use serde::Serialize;
use sha2::{Digest, Sha256};

/// > This enumeration's values distinguish whether client data was
/// > collected during registration (`create`) or authentication (`get`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClientDataType {
    #[serde(rename = "webauthn.create")]
    Create,
    #[serde(rename = "webauthn.get")]
    Get,
}

/// > This is data collected from the client platform about the ongoing
/// > authentication or registration ceremony, in the form of a
/// > [`CollectedClientData`] structure.
///
/// The Result Assembler builds one of these per ceremony, serializes it to
/// JSON via `serde_json`, and hashes the UTF-8 bytes with SHA-256 to feed
/// the authenticator as the `clientDataHash` — the CTAP2 operations never
/// see the JSON itself.
#[derive(Debug, Clone, Serialize)]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub data_type: ClientDataType,
    #[serde(serialize_with = "as_base64url")]
    pub challenge: Vec<u8>,
    pub origin: String,
}

impl CollectedClientData {
    /// Renders the canonical JSON form this engine produces: the fixed
    /// three-member object `{"type", "challenge", "origin"}`, challenge
    /// base64url-encoded without padding as WebAuthn requires.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .expect("client data JSON encoding is infallible for an in-memory struct")
    }

    /// SHA-256 of the UTF-8 JSON encoding, as fed to `clientDataHash`.
    pub fn hash(&self) -> [u8; 32] {
        Sha256::digest(self.to_json().as_bytes()).into()
    }
}

fn as_base64url<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use base64::Engine;
    serializer.serialize_str(&base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
