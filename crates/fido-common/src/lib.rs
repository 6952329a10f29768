pub mod attestation;
pub mod credential;
pub mod extension;
