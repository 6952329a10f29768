use super::Type;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// > This dictionary is used to supply additional Relying Party attributes
/// > when creating a new credential.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelyingPartyEntity {
    pub id: String,
    pub name: String,
}

/// > This dictionary is used to supply additional user account attributes
/// > when creating a new credential.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UserEntity {
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

/// > This dictionary is used to supply additional parameters when creating
/// > a new credential. It identifies a previously registered credential,
/// > as in the `excludeList` or `allowList` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Descriptor {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub credential_type: Type,
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub id: Vec<u8>,
}

impl Descriptor {
    pub fn public_key(id: Vec<u8>) -> Self {
        Self {
            credential_type: Type::PublicKey,
            id,
        }
    }
}

/// The COSE algorithm identifier for ES256 (ECDSA w/ SHA-256 over P-256),
/// the only algorithm this engine's Device Adapter accepts — see the
/// register filter in `fido2_engine::challenge`.
pub const COSE_ALGORITHM_ES256: i64 = -7;

/// > This dictionary is used to supply additional parameters when creating
/// > a new credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Parameters {
    #[cfg_attr(feature = "serde", serde(rename = "alg"))]
    pub algorithm: i64,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub credential_type: Type,
}

impl Parameters {
    pub const fn es256() -> Self {
        Self {
            algorithm: COSE_ALGORITHM_ES256,
            credential_type: Type::PublicKey,
        }
    }

    pub fn is_es256(&self) -> bool {
        self.algorithm == COSE_ALGORITHM_ES256
    }
}
