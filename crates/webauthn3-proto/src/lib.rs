//! `WebAuthn`-level shapes the Result Assembler (`fido2_engine::assembler`)
//! produces from a CTAP2 authenticator's raw output: collected client
//! data, attestation conveyance preference, and the public
//! `RegisterResponse`/`LoginResponse` envelopes handed back to the host.
//! No transport, no signature verification — this crate only describes
//! the shape of the artifacts a client assembles, never validates them.

pub mod attestation;
pub mod client_data;
pub mod response;

pub use attestation::ConveyancePreference;
pub use client_data::{ClientDataType, CollectedClientData};
pub use response::{LoginResponse, RegisterResponse};
