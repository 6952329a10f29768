#[cfg(feature = "serde")]
use base64::Engine;
#[cfg(feature = "serde")]
use serde::Serialize;

/// The public response the engine hands back from a successful `Register`
/// call. Mirrors the shape a `WebAuthn` client returns to its relying
/// party, minus the members this engine never populates (transports,
/// client extension outputs beyond `appid`).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RegisterResponse {
    #[cfg_attr(feature = "serde", serde(rename = "rawId", serialize_with = "as_base64url"))]
    pub raw_id: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "attestationObject", serialize_with = "as_base64url"))]
    pub attestation_object: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "clientDataJSON"))]
    pub client_data_json: String,
}

/// The public response the engine hands back from a successful `Login`
/// call.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LoginResponse {
    #[cfg_attr(feature = "serde", serde(rename = "rawId", serialize_with = "as_base64url"))]
    pub raw_id: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "authenticatorData", serialize_with = "as_base64url"))]
    pub authenticator_data: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(serialize_with = "as_base64url"))]
    pub signature: Vec<u8>,
    /// Empty for MFA (non-resident) credentials, per §6 of the record this
    /// response type implements.
    #[cfg_attr(feature = "serde", serde(rename = "userHandle", serialize_with = "as_base64url"))]
    pub user_handle: Vec<u8>,
    #[cfg_attr(feature = "serde", serde(rename = "clientDataJSON"))]
    pub client_data_json: String,
    /// Echoes the legacy `appid` extension back to the relying party when
    /// the engine fell back to a U2F authenticate for this ceremony.
    #[cfg_attr(feature = "serde", serde(rename = "appid", skip_serializing_if = "Option::is_none"))]
    pub app_id_used: Option<bool>,
}

#[cfg(feature = "serde")]
fn as_base64url<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}
