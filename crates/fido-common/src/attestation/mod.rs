pub mod enterprise;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// > Authenticators may implement various attestation statement formats.
/// > This engine's Device Adapter and Result Assembler understand the
/// > three formats a CTAP2 authenticator is realistically configured to
/// > emit for `authenticatorMakeCredential`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum FormatIdentifier {
    #[cfg_attr(feature = "serde", serde(rename = "packed"))]
    Packed,
    #[cfg_attr(feature = "serde", serde(rename = "fido-u2f"))]
    FidoU2F,
    #[cfg_attr(feature = "serde", serde(rename = "none"))]
    None,
}

/// > The attested credential data is a variable-length byte array added to
/// > the authenticator data when generating an attestation object for a
/// > given credential.
#[derive(Debug, Clone)]
pub struct CredentialData {
    pub aaguid: [u8; 16],
    pub credential_id: Vec<u8>,
    /// COSE_Key-encoded credential public key.
    pub credential_public_key: coset::CoseKey,
}

/// The attestation statement produced for a newly minted credential. The
/// shape mirrors `FormatIdentifier`: callers match on this enum rather than
/// inspecting `format()` and a separate payload, since the two can never
/// disagree.
#[derive(Debug, Clone)]
pub enum Statement {
    Packed {
        algorithm: i64,
        signature: Vec<u8>,
        certificates: Vec<Vec<u8>>,
    },
    FidoU2F {
        signature: Vec<u8>,
        certificates: Vec<Vec<u8>>,
    },
    None,
}

impl Statement {
    pub fn format(&self) -> FormatIdentifier {
        match self {
            Statement::Packed { .. } => FormatIdentifier::Packed,
            Statement::FidoU2F { .. } => FormatIdentifier::FidoU2F,
            Statement::None => FormatIdentifier::None,
        }
    }
}
